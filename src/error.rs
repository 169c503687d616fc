// File: src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkovError {
    #[error("configuration error: {0}")]
    Config(String),

    /// `successors` was asked about a context that was never registered.
    #[error("no transitions registered for key ({first}, {second})")]
    UnknownKey { first: i32, second: i32 },

    #[error("generation exceeded {limit} steps without reaching STOP")]
    GenerationOverrun { limit: usize },

    #[error("the model has not learned any sequence yet")]
    EmptyModel,

    #[error("word table is full")]
    VocabularyFull,

    #[error("corpus writer thread is no longer running")]
    WriterClosed,

    #[error("engine lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Persist(#[from] tempfile::PersistError),
}

pub type Result<T> = std::result::Result<T, MarkovError>;

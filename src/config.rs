// File: src/config.rs
use crate::core::generator::DEFAULT_MAX_STEPS;
use crate::error::{MarkovError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Everything the engine needs at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Corpus replayed at startup: plain text, or a `.yml`/`.yaml` token list.
    pub corpus_source: PathBuf,
    /// Append-only log of learned sequences. Must differ from the source.
    pub corpus_output: PathBuf,
    #[serde(default)]
    pub user_map: Option<PathBuf>,
    #[serde(default)]
    pub ignore_words: Vec<String>,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Hand corpus appends to a writer thread instead of writing inline.
    #[serde(default)]
    pub background_writes: bool,
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

impl EngineConfig {
    pub fn new(corpus_source: impl Into<PathBuf>, corpus_output: impl Into<PathBuf>) -> Self {
        Self {
            corpus_source: corpus_source.into(),
            corpus_output: corpus_output.into(),
            user_map: None,
            ignore_words: Vec::new(),
            max_steps: DEFAULT_MAX_STEPS,
            background_writes: false,
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if same_file(&self.corpus_source, &self.corpus_output) {
            return Err(MarkovError::Config(format!(
                "corpus source and output must be different files, both are {}",
                self.corpus_output.display()
            )));
        }
        if self.max_steps == 0 {
            return Err(MarkovError::Config("max_steps must be at least 1".into()));
        }
        Ok(())
    }
}

/// Compares canonical paths when both exist, raw paths otherwise.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_defaults_are_filled_in() {
        let config =
            EngineConfig::from_yaml_str("corpus_source: brain.yml\ncorpus_output: learned.txt\n")
                .unwrap();
        assert_eq!(config, EngineConfig::new("brain.yml", "learned.txt"));
    }

    #[test]
    fn identical_paths_are_rejected() {
        let err = EngineConfig::new("corpus.txt", "corpus.txt")
            .validate()
            .unwrap_err();
        assert!(matches!(err, MarkovError::Config(_)));
    }

    #[test]
    fn aliased_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("corpus.txt");
        std::fs::write(&file, "").unwrap();
        let alias = dir.path().join(".").join("corpus.txt");

        let err = EngineConfig::new(&file, &alias).validate().unwrap_err();
        assert!(matches!(err, MarkovError::Config(_)));
    }

    #[test]
    fn zero_step_cap_is_rejected() {
        let mut config = EngineConfig::new("a.txt", "b.txt");
        config.max_steps = 0;
        assert!(config.validate().is_err());
    }
}

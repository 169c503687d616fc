// --- File: src/core/vocab.rs
use crate::core::types::{Token, WordId, MAX_WORD_ID, START_TOKEN, STOP_TOKEN};
use crate::error::{MarkovError, Result};
use std::collections::HashMap;

/// Bidirectional word <-> index table.
///
/// Indices are handed out in observation order and never reused, so
/// `words.len()` is always one past the largest assigned id.
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    words: Vec<String>,
    lookup: HashMap<String, WordId>,
}

impl WordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets or assigns the token for `word`. Sentinel spellings map to the
    /// sentinels and are never stored.
    pub fn index_of(&mut self, word: &str) -> Result<Token> {
        if let Some(token) = self.lookup(word) {
            return Ok(token);
        }
        let id = self.words.len();
        if id > MAX_WORD_ID as usize {
            return Err(MarkovError::VocabularyFull);
        }
        let id = id as WordId;
        self.words.push(word.to_string());
        self.lookup.insert(word.to_string(), id);
        Ok(Token::Word(id))
    }

    /// Non-inserting variant of [`WordIndex::index_of`].
    pub fn lookup(&self, word: &str) -> Option<Token> {
        match word {
            START_TOKEN => Some(Token::Start),
            STOP_TOKEN => Some(Token::Stop),
            _ => self.lookup.get(word).copied().map(Token::Word),
        }
    }

    /// Inverse lookup. Panics for an id that was never assigned.
    pub fn word_at(&self, id: WordId) -> &str {
        match self.get(id) {
            Some(word) => word,
            None => panic!(
                "word id {} outside assigned range 0..{}",
                id,
                self.words.len()
            ),
        }
    }

    pub fn get(&self, id: WordId) -> Option<&str> {
        self.words.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

// File: src/core/tokenizer.rs
use crate::core::types::is_sentinel_spelling;
use std::collections::HashSet;
use std::str::SplitWhitespace;

/// Characters trimmed from both ends of a word before the ignore-set check.
const IGNORE_TRIM: &[char] = &[
    '\'', '"', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '.', ',', '/', '\\', '+', '=',
    '<', '>', '?', ':', ';',
];

/// Punctuation that ends a sentence when it terminates a word.
const TERMINATORS: &[char] = &['.', '?', '!'];

/// Splits raw text into punctuation-terminated token sequences.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    /// Upper-cased words that are dropped wherever they appear.
    ignore: HashSet<String>,
}

impl Tokenizer {
    pub fn new<I, S>(ignore_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ignore: ignore_words
                .into_iter()
                .map(|w| w.as_ref().to_uppercase())
                .collect(),
        }
    }

    pub fn is_ignored(&self, word: &str) -> bool {
        if self.ignore.is_empty() {
            return false;
        }
        self.ignore
            .contains(&word.trim_matches(IGNORE_TRIM).to_uppercase())
    }

    /// Lazily yields one `Vec<String>` per sentence of `text`.
    ///
    /// Literal `<START>`/`<STOP>` words are dropped like ignored words.
    /// A terminating word emits the current sequence even when it is empty
    /// (e.g. a lone "."). A trailing unterminated sequence is emitted only
    /// if it holds at least one word.
    pub fn tokenize<'a>(&'a self, text: &'a str) -> Sentences<'a> {
        Sentences {
            tokenizer: self,
            words: text.split_whitespace(),
            finished: false,
        }
    }

    /// One corpus log line is exactly one stored sequence, so it is split on
    /// whitespace only.
    pub fn split_record(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    /// Groups a pre-tokenized stream delimited by `<START>`/`<STOP>` runs.
    /// Punctuation and the ignore set are not consulted.
    pub fn split_delimited<I, S>(tokens: I) -> Vec<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sequences = Vec::new();
        let mut current: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.into();
            if is_sentinel_spelling(&token) {
                if !current.is_empty() {
                    sequences.push(std::mem::take(&mut current));
                }
            } else {
                current.push(token);
            }
        }
        if !current.is_empty() {
            sequences.push(current);
        }
        sequences
    }
}

/// Iterator returned by [`Tokenizer::tokenize`]. Clone it to replay.
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    tokenizer: &'a Tokenizer,
    words: SplitWhitespace<'a>,
    finished: bool,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut current = Vec::new();
        for word in self.words.by_ref() {
            if self.tokenizer.is_ignored(word) || is_sentinel_spelling(word) {
                continue;
            }
            if word.ends_with(TERMINATORS) {
                let stripped = word.trim_matches(TERMINATORS);
                if !stripped.is_empty() && !is_sentinel_spelling(stripped) {
                    current.push(stripped.to_string());
                }
                return Some(current);
            }
            current.push(word.to_string());
        }
        self.finished = true;
        if current.is_empty() {
            None
        } else {
            Some(current)
        }
    }
}

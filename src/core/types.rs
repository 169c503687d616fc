// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for an ordinary word. Position in the word table.
pub type WordId = u32;

pub const START_TOKEN: &str = "<START>";
pub const STOP_TOKEN: &str = "<STOP>";

/// Wire code of the START sentinel inside a graph key.
pub const START_CODE: i32 = -1;
/// Wire code of the STOP sentinel inside a graph key.
pub const STOP_CODE: i32 = -2;

/// True for the reserved spellings of START and STOP. They only ever act
/// as delimiters and are never learned as words.
pub fn is_sentinel_spelling(word: &str) -> bool {
    word == START_TOKEN || word == STOP_TOKEN
}

/// Largest word id that still fits the positive half of an `i32` code.
pub const MAX_WORD_ID: WordId = i32::MAX as WordId;

/// One position in a token sequence: either a real word or a sequence boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Token {
    Start,
    Stop,
    Word(WordId),
}

impl Token {
    /// Signed code used inside a `GraphKey`.
    pub fn code(self) -> i32 {
        match self {
            Token::Start => START_CODE,
            Token::Stop => STOP_CODE,
            // word ids are capped at MAX_WORD_ID by the word table
            Token::Word(id) => id as i32,
        }
    }

    /// Inverse of [`Token::code`]. Codes below `STOP_CODE` map to nothing.
    pub fn from_code(code: i32) -> Option<Token> {
        match code {
            START_CODE => Some(Token::Start),
            STOP_CODE => Some(Token::Stop),
            c if c >= 0 => Some(Token::Word(c as WordId)),
            _ => None,
        }
    }

    pub fn word_id(self) -> Option<WordId> {
        match self {
            Token::Word(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_sentinel(self) -> bool {
        !matches!(self, Token::Word(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Start => f.write_str(START_TOKEN),
            Token::Stop => f.write_str(STOP_TOKEN),
            Token::Word(id) => write!(f, "#{}", id),
        }
    }
}

/// Direction of the mention substitution applied to a finished reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionFormat {
    /// canonical name -> platform mention string
    #[default]
    Platform,
    /// platform mention string -> canonical name
    Canonical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_codes_are_fixed() {
        assert_eq!(Token::Start.code(), -1);
        assert_eq!(Token::Stop.code(), -2);
        assert_eq!(Token::from_code(-1), Some(Token::Start));
        assert_eq!(Token::from_code(-2), Some(Token::Stop));
        assert_eq!(Token::from_code(-3), None);
        assert_eq!(Token::from_code(i32::MIN), None);
    }

    #[test]
    fn sentinel_spellings_are_exact() {
        assert!(is_sentinel_spelling("<START>"));
        assert!(is_sentinel_spelling("<STOP>"));
        assert!(!is_sentinel_spelling("<start>"));
        assert!(!is_sentinel_spelling("<STOP>."));
    }

    #[test]
    fn word_codes_round_trip() {
        for id in [0, 1, 42, MAX_WORD_ID] {
            let token = Token::Word(id);
            assert_eq!(Token::from_code(token.code()), Some(token));
        }
    }
}

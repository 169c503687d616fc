// File: src/core/key.rs
use crate::core::types::Token;
use serde::{Deserialize, Serialize};

/// Fill value for the unused slot of a single-token key.
/// No `Token` ever encodes to it, so single and pair keys cannot collide.
pub const PLACEHOLDER: i32 = i32::MIN;

/// Context used to look up successors: one prior token, or two.
///
/// Stored as two plain signed fields so it hashes directly as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphKey {
    first: i32,
    second: i32,
}

impl GraphKey {
    /// Encodes an ordered pair of codes. `encode(a, PLACEHOLDER)` is a single key.
    pub const fn encode(first: i32, second: i32) -> Self {
        Self { first, second }
    }

    pub const fn encode_single(first: i32) -> Self {
        Self::encode(first, PLACEHOLDER)
    }

    pub const fn decode(self) -> (i32, i32) {
        (self.first, self.second)
    }

    pub fn single(token: Token) -> Self {
        Self::encode_single(token.code())
    }

    pub fn pair(first: Token, second: Token) -> Self {
        Self::encode(first.code(), second.code())
    }

    pub fn start() -> Self {
        Self::single(Token::Start)
    }

    pub fn is_single(self) -> bool {
        self.second == PLACEHOLDER
    }

    /// Leading token of the context, if the code is a valid token.
    pub fn leading(self) -> Option<Token> {
        Token::from_code(self.first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn decode_inverts_encode_for_random_pairs() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let (a, b): (i32, i32) = (rng.gen(), rng.gen());
            assert_eq!(GraphKey::encode(a, b).decode(), (a, b));
        }
    }

    #[test]
    fn decode_inverts_encode_at_the_edges() {
        let edges = [i32::MIN, -2, -1, 0, 1, i32::MAX];
        for &a in &edges {
            for &b in &edges {
                assert_eq!(GraphKey::encode(a, b).decode(), (a, b));
            }
        }
    }

    #[test]
    fn single_key_uses_placeholder() {
        assert_eq!(GraphKey::encode_single(5), GraphKey::encode(5, PLACEHOLDER));
        assert_eq!(GraphKey::single(Token::Word(5)), GraphKey::encode_single(5));
        assert!(GraphKey::start().is_single());
    }

    #[test]
    fn single_and_pair_shapes_never_collide() {
        let word = Token::Word(3);
        let singles = [GraphKey::single(word)];
        let pairs = [
            GraphKey::pair(word, Token::Start),
            GraphKey::pair(word, Token::Stop),
            GraphKey::pair(word, Token::Word(0)),
        ];
        for s in &singles {
            assert!(!pairs.contains(s));
        }
    }
}

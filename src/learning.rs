// File: src/learning.rs
use crate::core::types::{is_sentinel_spelling, Token};
use crate::core::{graph::TransitionGraph, key::GraphKey, vocab::WordIndex};
use crate::error::Result;
use tracing::debug;

/// Applies the second-order build protocol to the graph, one sequence at a time.
pub struct LearningEngine;

impl LearningEngine {
    pub fn new() -> Self {
        Self
    }

    /// Registers every transition of `sequence` (implicitly followed by STOP).
    ///
    /// For each window `(w1, w2, w3)`: the first window also registers
    /// `START -> w1` and `w1 -> w2`; every window registers `(w1, w2) -> w3`.
    /// Returns true if any registration changed the graph. Sequences shorter
    /// than two words produce no window and are never learned, and neither
    /// are sequences holding a literal `<START>`/`<STOP>`.
    pub fn learn<S: AsRef<str>>(
        &self,
        vocab: &mut WordIndex,
        graph: &mut TransitionGraph,
        sequence: &[S],
    ) -> Result<bool> {
        if sequence.len() < 2 {
            return Ok(false);
        }
        if sequence.iter().any(|word| is_sentinel_spelling(word.as_ref())) {
            debug!(words = sequence.len(), "skipped sequence holding a sentinel");
            return Ok(false);
        }

        let mut tokens = Vec::with_capacity(sequence.len() + 1);
        for word in sequence {
            tokens.push(vocab.index_of(word.as_ref())?);
        }
        tokens.push(Token::Stop);

        let mut learned = false;
        for (i, window) in tokens.windows(3).enumerate() {
            let (w1, w2, w3) = (window[0], window[1], window[2]);
            if i == 0 {
                learned |= graph.try_append(GraphKey::start(), w1);
                learned |= graph.try_append(GraphKey::single(w1), w2);
            }
            learned |= graph.try_append(GraphKey::pair(w1, w2), w3);
        }

        if learned {
            debug!(words = sequence.len(), "learned new sequence");
        }
        Ok(learned)
    }

    /// Feeds every sequence through [`LearningEngine::learn`] and returns the
    /// ones that changed the graph, in input order.
    pub fn learn_all<I>(
        &self,
        vocab: &mut WordIndex,
        graph: &mut TransitionGraph,
        sequences: I,
    ) -> Result<Vec<Vec<String>>>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut changed = Vec::new();
        for sequence in sequences {
            if self.learn(vocab, graph, &sequence)? {
                changed.push(sequence);
            }
        }
        Ok(changed)
    }
}

impl Default for LearningEngine {
    fn default() -> Self {
        Self::new()
    }
}

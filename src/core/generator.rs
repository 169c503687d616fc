// File: src/core/generator.rs
use crate::core::{graph::TransitionGraph, key::GraphKey, types::Token, vocab::WordIndex};
use crate::error::{MarkovError, Result};
use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_MAX_STEPS: usize = 512;

/// Random walk over the transition graph.
#[derive(Debug, Clone, Copy)]
pub struct Generator {
    max_steps: usize,
}

impl Generator {
    pub fn new(max_steps: usize) -> Self {
        Self {
            max_steps: max_steps.max(1),
        }
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Walks the graph from `seed` (or a random sentence opener) until STOP.
    ///
    /// The seed is used only if it is an ordinary word registered as a
    /// single-token key. Every learned sequence ends in STOP, so a walk
    /// terminates with probability 1; `max_steps` bounds it anyway.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        graph: &TransitionGraph,
        vocab: &WordIndex,
        seed: Option<Token>,
        rng: &mut R,
    ) -> Result<String> {
        let seeded = seed.filter(|t| !t.is_sentinel() && graph.contains_key(GraphKey::single(*t)));
        let mut w1 = match seeded {
            Some(token) => token,
            None => pick(graph, GraphKey::start(), rng)?,
        };
        let mut w2 = pick(graph, GraphKey::single(w1), rng)?;

        let mut output = vec![w1];
        while w2 != Token::Stop {
            if output.len() >= self.max_steps {
                return Err(MarkovError::GenerationOverrun {
                    limit: self.max_steps,
                });
            }
            let w3 = pick(graph, GraphKey::pair(w1, w2), rng)?;
            w1 = w2;
            w2 = w3;
            output.push(w1);
        }

        let words: Vec<&str> = output
            .into_iter()
            .filter_map(Token::word_id)
            .map(|id| vocab.word_at(id))
            .collect();
        Ok(words.join(" "))
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STEPS)
    }
}

fn pick<R: Rng + ?Sized>(graph: &TransitionGraph, key: GraphKey, rng: &mut R) -> Result<Token> {
    let choices = graph.successors(key)?;
    match choices.choose(rng) {
        Some(&token) => Ok(token),
        None if key == GraphKey::start() => Err(MarkovError::EmptyModel),
        None => {
            let (first, second) = key.decode();
            Err(MarkovError::UnknownKey { first, second })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::LearningEngine;
    use rand::{rngs::StdRng, SeedableRng};

    fn build(corpus: &[&[&str]]) -> (WordIndex, TransitionGraph) {
        let mut vocab = WordIndex::new();
        let mut graph = TransitionGraph::new();
        let learner = LearningEngine::new();
        for &seq in corpus {
            learner.learn(&mut vocab, &mut graph, seq).unwrap();
        }
        (vocab, graph)
    }

    #[test]
    fn seeded_walk_reproduces_single_sentence() {
        let (vocab, graph) = build(&[&["the", "quick", "fox"]]);
        let mut rng = StdRng::seed_from_u64(1);
        let seed = vocab.lookup("the");
        let text = Generator::default()
            .generate(&graph, &vocab, seed, &mut rng)
            .unwrap();
        assert_eq!(text, "the quick fox");
    }

    #[test]
    fn unseeded_walk_starts_from_an_opener() {
        let (vocab, graph) = build(&[&["a", "b", "c"], &["x", "y"]]);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let text = Generator::default()
                .generate(&graph, &vocab, None, &mut rng)
                .unwrap();
            assert!(text == "a b c" || text == "x y", "unexpected: {text}");
        }
    }

    #[test]
    fn seed_that_is_not_a_single_key_falls_back() {
        let (vocab, graph) = build(&[&["a", "b", "c"]]);
        let mut rng = StdRng::seed_from_u64(5);
        let seed = vocab.lookup("b");
        let text = Generator::default()
            .generate(&graph, &vocab, seed, &mut rng)
            .unwrap();
        assert_eq!(text, "a b c");
    }

    #[test]
    fn empty_model_is_an_error() {
        let (vocab, graph) = build(&[]);
        let mut rng = StdRng::seed_from_u64(0);
        let err = Generator::default()
            .generate(&graph, &vocab, None, &mut rng)
            .unwrap_err();
        assert!(matches!(err, MarkovError::EmptyModel));
    }

    #[test]
    fn step_cap_turns_long_walks_into_overruns() {
        let long: Vec<String> = (0..20).map(|i| format!("w{i}")).collect();
        let long: Vec<&str> = long.iter().map(String::as_str).collect();
        let (vocab, graph) = build(&[long.as_slice()]);
        let mut rng = StdRng::seed_from_u64(9);

        let err = Generator::new(5)
            .generate(&graph, &vocab, None, &mut rng)
            .unwrap_err();
        assert!(matches!(err, MarkovError::GenerationOverrun { limit: 5 }));

        let text = Generator::new(20)
            .generate(&graph, &vocab, None, &mut rng)
            .unwrap();
        assert_eq!(text.split(' ').count(), 20);
    }

    #[test]
    fn cyclic_corpus_terminates_within_cap() {
        // "a b a b" style loops still offer STOP at the end of every sentence.
        let (vocab, graph) = build(&[
            &["a", "b", "a", "b", "a"],
            &["b", "a", "b"],
            &["a", "b"],
        ]);
        let mut rng = StdRng::seed_from_u64(11);
        let generator = Generator::new(10_000);
        for _ in 0..200 {
            generator.generate(&graph, &vocab, None, &mut rng).unwrap();
        }
    }
}

// --- File: src/core/graph.rs
use crate::core::key::GraphKey;
use crate::core::types::Token;
use crate::error::{MarkovError, Result};
use std::collections::{HashMap, HashSet};

/// The learned model: context key -> successors.
///
/// Successor lists are deduplicated and keep first-insertion order. They are
/// short in practice, so a linear `contains` beats a per-key hash set.
#[derive(Debug, Clone)]
pub struct TransitionGraph {
    edges: HashMap<GraphKey, Vec<Token>>,
    /// Leading codes of every registered key, single or pair.
    leaders: HashSet<i32>,
}

impl TransitionGraph {
    /// An empty graph with the START key already registered.
    pub fn new() -> Self {
        let mut graph = Self {
            edges: HashMap::new(),
            leaders: HashSet::new(),
        };
        graph.register(GraphKey::start());
        graph
    }

    fn register(&mut self, key: GraphKey) -> &mut Vec<Token> {
        self.leaders.insert(key.decode().0);
        self.edges.entry(key).or_default()
    }

    /// Appends `value` under `key` unless already present. Returns whether
    /// the graph changed.
    pub fn try_append(&mut self, key: GraphKey, value: Token) -> bool {
        let successors = self.register(key);
        if successors.contains(&value) {
            return false;
        }
        successors.push(value);
        true
    }

    pub fn successors(&self, key: GraphKey) -> Result<&[Token]> {
        self.edges.get(&key).map(Vec::as_slice).ok_or_else(|| {
            let (first, second) = key.decode();
            MarkovError::UnknownKey { first, second }
        })
    }

    pub fn contains_key(&self, key: GraphKey) -> bool {
        self.edges.contains_key(&key)
    }

    /// True if `token` leads any registered key, as a single-token key or as
    /// the first half of a pair. The two shapes are deliberately not told apart.
    pub fn is_seed_candidate(&self, token: Token) -> bool {
        self.leaders.contains(&token.code())
    }

    /// Number of registered keys, START included.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True when nothing but the empty START key is registered.
    pub fn is_empty(&self) -> bool {
        self.edges.len() <= 1 && self.edges.values().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GraphKey, &[Token])> + '_ {
        self.edges.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

impl Default for TransitionGraph {
    fn default() -> Self {
        Self::new()
    }
}

use crate::config::EngineConfig;
use crate::core::{
    generator::Generator, graph::TransitionGraph, tokenizer::Tokenizer, types::MentionFormat,
    types::Token, vocab::WordIndex,
};
use crate::error::{MarkovError, Result};
use crate::learning::LearningEngine;
use crate::mapping::UserMapper;
use crate::persistence::{load_source_or_empty, read_log, CorpusSink, CorpusStore};
use crate::writer::BackgroundWriter;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Generation attempts per reply; attempts after the first drop the seed.
const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub words: usize,
    pub keys: usize,
}

// The engine exclusively owns the model. Mutation needs `&mut self`;
// generation is a pure read over `&self`.
pub struct MarkovEngine {
    vocab: WordIndex,
    graph: TransitionGraph,
    tokenizer: Tokenizer,
    learning_engine: LearningEngine,
    generator: Generator,
    user_map: UserMapper,
    corpus: Box<dyn CorpusSink>,
    // learned but not yet accepted by `corpus`
    pending: Vec<Vec<String>>,
}

impl MarkovEngine {
    /// An engine with an empty model writing learned sequences to `corpus`.
    pub fn new(
        tokenizer: Tokenizer,
        generator: Generator,
        user_map: UserMapper,
        corpus: Box<dyn CorpusSink>,
    ) -> Self {
        Self {
            vocab: WordIndex::new(),
            graph: TransitionGraph::new(),
            tokenizer,
            learning_engine: LearningEngine::new(),
            generator,
            user_map,
            corpus,
            pending: Vec::new(),
        }
    }

    /// Builds the model from the configured source plus the existing output
    /// log, then rewrites the log with every learned sequence.
    ///
    /// Unreadable source or user map files only produce warnings.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let tokenizer = Tokenizer::new(&config.ignore_words);
        let user_map = config
            .user_map
            .as_deref()
            .map(UserMapper::load_or_empty)
            .unwrap_or_default();
        let mut sequences = load_source_or_empty(&config.corpus_source, &tokenizer);
        match read_log(&config.corpus_output) {
            Ok(logged) => sequences.extend(logged),
            Err(e) => warn!(
                path = %config.corpus_output.display(),
                error = %e,
                "could not replay corpus log, previously learned phrases are lost"
            ),
        }

        let mut store = CorpusStore::new(&config.corpus_output);
        let mut vocab = WordIndex::new();
        let mut graph = TransitionGraph::new();
        let learning_engine = LearningEngine::new();
        let learned = learning_engine.learn_all(&mut vocab, &mut graph, sequences)?;
        store.rewrite(&learned)?;

        let corpus: Box<dyn CorpusSink> = if config.background_writes {
            Box::new(BackgroundWriter::spawn(store)?)
        } else {
            Box::new(store)
        };

        info!(
            words = vocab.len(),
            keys = graph.len(),
            sequences = learned.len(),
            "markov engine ready"
        );
        Ok(Self {
            vocab,
            graph,
            tokenizer,
            learning_engine,
            generator: Generator::new(config.max_steps),
            user_map,
            corpus,
            pending: Vec::new(),
        })
    }

    /// Learns sequences without persisting them. Returns the ones that
    /// changed the graph.
    pub fn ingest<I>(&mut self, sequences: I) -> Result<Vec<Vec<String>>>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        self.learning_engine
            .learn_all(&mut self.vocab, &mut self.graph, sequences)
    }

    /// Tokenizes `text`, learns it and appends what was new to the corpus.
    /// Returns the number of sequences learned.
    ///
    /// If the append fails the learned sequences stay queued and are written
    /// ahead of the next learn's, so the log catches up with the graph even
    /// when the same text is learned again.
    pub fn learn(&mut self, text: &str) -> Result<usize> {
        let sequences: Vec<Vec<String>> = self.tokenizer.tokenize(text).collect();
        let learned = self.ingest(sequences)?;
        let count = learned.len();
        self.pending.extend(learned);
        self.flush_pending()?;
        Ok(count)
    }

    fn flush_pending(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.corpus.append(&self.pending) {
            warn!(
                queued = self.pending.len(),
                error = %e,
                "corpus append failed, keeping sequences queued"
            );
            return Err(e);
        }
        self.pending.clear();
        Ok(())
    }

    /// Learned sequences still waiting for a successful append.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn generate(&self, seed: Option<&str>) -> Result<String> {
        self.generate_with(seed, &mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, seed: Option<&str>, rng: &mut R) -> Result<String> {
        let seed = seed.and_then(|word| self.vocab.lookup(word));
        self.generator.generate(&self.graph, &self.vocab, seed, rng)
    }

    /// Picks a seed among the prompt's words, all but the last two, that
    /// lead a registered key of either shape.
    pub fn select_seed<R: Rng + ?Sized>(&self, prompt: &str, rng: &mut R) -> Option<Token> {
        let tokens: Vec<&str> = prompt.split_whitespace().collect();
        let eligible = tokens.len().saturating_sub(2);
        let candidates: Vec<Token> = tokens[..eligible]
            .iter()
            .filter_map(|word| self.vocab.lookup(word))
            .filter(|token| !token.is_sentinel() && self.graph.is_seed_candidate(*token))
            .collect();
        candidates.choose(rng).copied()
    }

    /// Generates a reply to `prompt` without touching the model.
    ///
    /// Overruns are retried without a seed; the last error is returned if
    /// every attempt overruns.
    pub fn reply<R: Rng + ?Sized>(&self, prompt: &str, rng: &mut R) -> Result<String> {
        let mut seed = self.select_seed(prompt, rng);
        if let Some(Token::Word(id)) = seed {
            debug!(seed = self.vocab.word_at(id), "selected seed");
        }
        let mut attempt = 1;
        loop {
            match self.generator.generate(&self.graph, &self.vocab, seed, rng) {
                Err(MarkovError::GenerationOverrun { limit }) if attempt < MAX_ATTEMPTS => {
                    warn!(limit, attempt, "generation overran, retrying unseeded");
                    seed = None;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    pub fn create_response(
        &mut self,
        prompt: &str,
        learn: bool,
        format: MentionFormat,
    ) -> Result<String> {
        self.create_response_with(prompt, learn, format, &mut rand::thread_rng())
    }

    /// Replies to `prompt`, then learns it if asked.
    ///
    /// Every prompt word is registered in the vocabulary before generating.
    /// [`SharedEngine::create_response`](crate::service::SharedEngine::create_response)
    /// skips that step to stay under the read lock; unseen words cannot be
    /// seeds, so both produce the same replies.
    ///
    /// The prompt is learned even when generation fails, so a model that
    /// starts empty can still grow. A failed learn is logged and does not
    /// discard the reply; its sequences stay queued for the next learn.
    pub fn create_response_with<R: Rng + ?Sized>(
        &mut self,
        prompt: &str,
        learn: bool,
        format: MentionFormat,
        rng: &mut R,
    ) -> Result<String> {
        for word in prompt.split_whitespace() {
            self.vocab.index_of(word)?;
        }
        let reply = self.reply(prompt, rng);
        if learn {
            match self.learn(prompt) {
                Ok(learned) => debug!(learned, "learned from prompt"),
                Err(e) => warn!(error = %e, "could not learn from prompt"),
            }
        }
        Ok(self.format(&reply?, format))
    }

    /// `count` unseeded replies, one per line.
    pub fn create_responses(&self, count: usize, format: MentionFormat) -> Result<String> {
        self.create_responses_with(count, format, &mut rand::thread_rng())
    }

    /// Replies that fail are logged and left out. The error is returned only
    /// when none of the `count` replies succeeds.
    pub fn create_responses_with<R: Rng + ?Sized>(
        &self,
        count: usize,
        format: MentionFormat,
        rng: &mut R,
    ) -> Result<String> {
        let mut replies = Vec::with_capacity(count);
        let mut last_error = None;
        for _ in 0..count {
            match self.reply("", rng) {
                Ok(reply) => replies.push(self.format(&reply, format)),
                Err(e) => {
                    warn!(error = %e, "skipping failed reply in batch");
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if replies.is_empty() => Err(e),
            _ => Ok(replies.join("\n")),
        }
    }

    pub fn format(&self, text: &str, format: MentionFormat) -> String {
        self.user_map.apply(text, format)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            words: self.vocab.len(),
            keys: self.graph.len(),
        }
    }

    pub fn vocab(&self) -> &WordIndex {
        &self.vocab
    }

    pub fn graph(&self) -> &TransitionGraph {
        &self.graph
    }
}

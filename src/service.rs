// File: src/service.rs
use crate::core::engine::{EngineStats, MarkovEngine};
use crate::core::types::MentionFormat;
use crate::error::{MarkovError, Result};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

/// Cloneable handle sharing one engine between request handlers.
///
/// Replies are generated under the read lock and may run concurrently.
/// Learning takes the write lock, so a reply never sees a half-updated
/// successor list; a reply that started before a learn finished just does
/// not reflect it yet.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<RwLock<MarkovEngine>>,
}

impl SharedEngine {
    pub fn new(engine: MarkovEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MarkovEngine>> {
        self.inner.read().map_err(|_| MarkovError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MarkovEngine>> {
        self.inner.write().map_err(|_| MarkovError::Poisoned)
    }

    pub fn generate(&self, seed: Option<&str>) -> Result<String> {
        self.read()?.generate(seed)
    }

    pub fn learn(&self, text: &str) -> Result<usize> {
        self.write()?.learn(text)
    }

    /// Same contract as [`MarkovEngine::create_response`], holding the write
    /// lock only for the learn step.
    ///
    /// Prompt words are not registered before generation here; words the
    /// model has never seen cannot be seeds, so replies are unaffected.
    pub fn create_response(&self, prompt: &str, learn: bool, format: MentionFormat) -> Result<String> {
        let reply = {
            let engine = self.read()?;
            engine
                .reply(prompt, &mut rand::thread_rng())
                .map(|text| engine.format(&text, format))
        };
        if learn {
            if let Err(e) = self.learn(prompt) {
                warn!(error = %e, "could not learn from prompt");
            }
        }
        reply
    }

    pub fn create_responses(&self, count: usize, format: MentionFormat) -> Result<String> {
        self.read()?.create_responses(count, format)
    }

    pub fn stats(&self) -> Result<EngineStats> {
        Ok(self.read()?.stats())
    }
}

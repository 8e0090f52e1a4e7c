//! AI-backed text translation.
//!
//! [`Translator`] holds the view state. Requests are built by
//! [`Translator::prepare`], executed by a [`TranslationBackend`] (usually on a
//! [`TranslationWorker`] thread) and applied with [`Translator::complete`];
//! results from superseded requests are dropped.

pub mod config;
pub mod debounce;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod worker;

pub use config::{AiConfig, Provider};
pub use error::{is_transient, user_message, TranslateError};
pub use provider::{ProviderRouter, TranslationBackend, TranslationRequest};
pub use worker::{Generations, RequestToken, TranslationOutcome, TranslationWorker};

use crate::history::{BoundedHistory, HISTORY_LIMIT};
use crate::store::{load_or, KeyValueStore, Persisted, TRANSLATE_HISTORY_KEY};
use debounce::Debouncer;
use prompt::{AUTO_DETECT, DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub source: String,
    pub target: String,
}

pub struct Translator {
    source_text: String,
    output: String,
    source_lang: String,
    target_lang: String,
    loading: bool,
    error: Option<String>,
    history: Persisted<BoundedHistory<HistoryEntry>>,
    debouncer: Debouncer,
    generations: Generations,
}

impl Translator {
    pub fn load(store: &dyn KeyValueStore, debounce: Duration, history_limit: usize) -> Self {
        let saved: Vec<HistoryEntry> = load_or(store, TRANSLATE_HISTORY_KEY, Vec::new());
        Self {
            source_text: String::new(),
            output: String::new(),
            source_lang: DEFAULT_SOURCE_LANG.into(),
            target_lang: DEFAULT_TARGET_LANG.into(),
            loading: false,
            error: None,
            history: Persisted::new(
                TRANSLATE_HISTORY_KEY,
                BoundedHistory::from_vec(saved, history_limit),
            ),
            debouncer: Debouncer::new(debounce),
            generations: Generations::default(),
        }
    }

    pub fn with_defaults(store: &dyn KeyValueStore) -> Self {
        Self::load(store, Duration::from_secs(1), HISTORY_LIMIT)
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &BoundedHistory<HistoryEntry> {
        self.history.get()
    }

    pub fn set_source_text(&mut self, text: impl Into<String>, now: Instant) {
        self.source_text = text.into();
        self.debouncer.touch(now);
    }

    pub fn set_source_lang(&mut self, code: impl Into<String>, now: Instant) {
        self.source_lang = code.into();
        self.debouncer.touch(now);
    }

    /// Set the target language. `auto` is not a valid target and is ignored.
    pub fn set_target_lang(&mut self, code: impl Into<String>, now: Instant) -> bool {
        let code = code.into();
        if code == AUTO_DETECT {
            return false;
        }
        self.target_lang = code;
        self.debouncer.touch(now);
        true
    }

    /// Exchange languages and texts. Not possible while the source is `auto`.
    pub fn swap_languages(&mut self, now: Instant) -> bool {
        if self.source_lang == AUTO_DETECT {
            return false;
        }
        std::mem::swap(&mut self.source_lang, &mut self.target_lang);
        std::mem::swap(&mut self.source_text, &mut self.output);
        self.debouncer.touch(now);
        true
    }

    /// Empty both texts and the error slot, abandoning any in-flight request.
    pub fn clear(&mut self) {
        self.source_text.clear();
        self.output.clear();
        self.error = None;
        self.loading = false;
        self.debouncer.cancel();
        self.generations.supersede();
    }

    /// Show a history entry again without issuing a request. Any request
    /// still in flight is abandoned.
    pub fn recall(&mut self, index: usize) -> bool {
        let Some(entry) = self.history.get().get(index).cloned() else {
            return false;
        };
        self.source_text = entry.source;
        self.output = entry.target;
        self.error = None;
        self.loading = false;
        self.debouncer.cancel();
        self.generations.supersede();
        true
    }

    /// Whether the debounce period after the last edit has elapsed.
    pub fn due(&mut self, now: Instant) -> bool {
        self.debouncer.poll(now)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Start a request for the current input. Blank input resets the output
    /// and clears the error instead.
    pub fn prepare(&mut self, config: &AiConfig) -> Option<(RequestToken, TranslationRequest)> {
        if self.source_text.trim().is_empty() {
            self.generations.supersede();
            self.output.clear();
            self.error = None;
            self.loading = false;
            return None;
        }
        let token = self.generations.next();
        self.loading = true;
        self.error = None;
        tracing::debug!(request = token.id(), "translation requested");
        Some((
            token,
            TranslationRequest {
                text: self.source_text.clone(),
                source_lang: self.source_lang.clone(),
                target_lang: self.target_lang.clone(),
                config: config.clone(),
            },
        ))
    }

    /// Apply a finished request. Returns false when it was superseded.
    pub fn complete(&mut self, outcome: TranslationOutcome, store: &dyn KeyValueStore) -> bool {
        if !outcome.token.is_current() {
            tracing::debug!(request = outcome.token.id(), "discarding stale translation");
            return false;
        }
        self.loading = false;
        match outcome.result {
            Ok(text) => {
                let translated = text.trim().to_string();
                self.output = translated.clone();
                if !translated.is_empty() {
                    let entry = HistoryEntry {
                        source: outcome.source,
                        target: translated,
                    };
                    let saved = self.history.update(store, |h| {
                        h.push_front_unique_by(entry, |e| e.source.clone())
                    });
                    if let Err(e) = saved {
                        tracing::error!("failed to save translation history: {e}");
                    }
                }
            }
            Err(TranslateError::Cancelled) => {}
            Err(e) => {
                tracing::warn!("translation failed: {e}");
                self.error = Some(user_message(&e));
            }
        }
        true
    }

    /// Run one request on the calling thread.
    pub fn translate_blocking(
        &mut self,
        backend: &dyn TranslationBackend,
        config: &AiConfig,
        store: &dyn KeyValueStore,
    ) {
        let Some((token, request)) = self.prepare(config) else {
            return;
        };
        let result = backend.translate(&request, &token);
        self.complete(
            TranslationOutcome {
                token,
                source: request.text,
                result,
            },
            store,
        );
    }

    /// Submit a request to `worker` if the debounce period has elapsed.
    pub fn tick(&mut self, now: Instant, config: &AiConfig, worker: &TranslationWorker) {
        if !self.due(now) {
            return;
        }
        if let Some((token, request)) = self.prepare(config) {
            worker.spawn(token, request);
        }
    }

    /// Apply every outcome the worker has delivered.
    pub fn drain(&mut self, worker: &TranslationWorker, store: &dyn KeyValueStore) {
        for outcome in worker.drain() {
            self.complete(outcome, store);
        }
    }
}

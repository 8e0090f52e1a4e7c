use super::error::TranslateError;
use super::provider::{TranslationBackend, TranslationRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

/// Hands out increasing request ids; only the newest one is current.
#[derive(Debug, Clone, Default)]
pub struct Generations {
    latest: Arc<AtomicU64>,
}

impl Generations {
    pub fn next(&self) -> RequestToken {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RequestToken {
            id,
            latest: self.latest.clone(),
        }
    }

    /// Invalidate every outstanding token.
    pub fn supersede(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct RequestToken {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl RequestToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id
    }
}

#[derive(Debug)]
pub struct TranslationOutcome {
    pub token: RequestToken,
    /// Source text the request was issued for.
    pub source: String,
    pub result: Result<String, TranslateError>,
}

/// Runs each request on its own thread and reports back over a channel.
pub struct TranslationWorker {
    backend: Arc<dyn TranslationBackend>,
    tx: Sender<TranslationOutcome>,
    rx: Receiver<TranslationOutcome>,
}

impl TranslationWorker {
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { backend, tx, rx }
    }

    pub fn spawn(&self, token: RequestToken, request: TranslationRequest) {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        let fallback_tx = self.tx.clone();
        let fallback_token = token.clone();
        let source = request.text.clone();
        let spawned = std::thread::Builder::new()
            .name("translator".into())
            .spawn(move || {
                let result = backend.translate(&request, &token);
                let _ = tx.send(TranslationOutcome {
                    token,
                    source: request.text,
                    result,
                });
            });
        if let Err(e) = spawned {
            tracing::error!("failed to start translation thread: {e}");
            let _ = fallback_tx.send(TranslationOutcome {
                token: fallback_token,
                source,
                result: Err(TranslateError::Transport(e.to_string())),
            });
        }
    }

    /// Outcomes that have arrived so far.
    pub fn drain(&self) -> Vec<TranslationOutcome> {
        self.rx.try_iter().collect()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<TranslationOutcome> {
        self.rx.recv_timeout(timeout).ok()
    }
}

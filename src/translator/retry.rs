use super::error::{is_transient, TranslateError};
use crate::settings::Settings;
use std::time::Duration;

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Exponential backoff for transient provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1500),
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_attempts: settings.retry_attempts.max(1),
            initial_delay: Duration::from_millis(settings.retry_initial_delay_ms),
        }
    }

    /// Pause after failed attempt `attempt` (1-based): initial * 2^(attempt-1).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    /// `is_current` is checked around every pause; once it turns false the
    /// run ends with [`TranslateError::Cancelled`].
    pub fn run<T>(
        &self,
        sleeper: &dyn Sleeper,
        is_current: &dyn Fn() -> bool,
        mut op: impl FnMut(u32) -> Result<T, TranslateError>,
    ) -> Result<T, TranslateError> {
        let max = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(v) => return Ok(v),
                Err(e) if attempt < max && is_transient(&e) => {
                    if !is_current() {
                        return Err(TranslateError::Cancelled);
                    }
                    let delay = self.delay_after(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient translation failure, retrying: {e}"
                    );
                    sleeper.sleep(delay);
                    if !is_current() {
                        return Err(TranslateError::Cancelled);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

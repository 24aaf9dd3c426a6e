//! Bounded retry with jittered exponential backoff
//!
//! The only retried operation in the system is the page fetch; nothing
//! above this layer retries anything.

use crate::config::RetryConfig;
use crate::harvester::fetcher::FetchError;
use std::future::Future;
use std::time::Duration;

/// Retry profile for page fetches
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: f64,
    jitter_max: f64,
}

/// A failure the retry layer could not recover from
#[derive(Debug)]
pub enum TerminalFailure {
    /// The fetch was classified fatal; remaining attempts were not used
    Fatal { reason: String },

    /// The attempt budget ran out; carries the last transient reason
    Exhausted { attempts: u32, last_reason: String },
}

impl std::fmt::Display for TerminalFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fatal { reason } => write!(f, "{}", reason),
            Self::Exhausted {
                attempts,
                last_reason,
            } => write!(f, "Failed after {} attempts: {}", attempts, last_reason),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff_base: config.backoff_base,
            jitter_max: config.jitter_max,
        }
    }

    /// Backoff before the retry following the given attempt
    ///
    /// Attempt numbering starts at 0, so the first retry waits
    /// `base^0 = 1` unit plus jitter, the second `base^1`, and so on.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let backoff = self.backoff_base.powi(attempt as i32);
        let jitter = fastrand::f64() * self.jitter_max;
        Duration::from_secs_f64(backoff + jitter)
    }

    /// Runs a fetch operation under this policy
    ///
    /// Transient failures sleep and retry until the attempt budget is
    /// exhausted; a fatal failure returns immediately without consuming
    /// the remaining attempts.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, TerminalFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut last_reason = String::new();

        for attempt in 0..self.max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(FetchError::Fatal { reason }) => {
                    return Err(TerminalFailure::Fatal { reason })
                }
                Err(FetchError::Transient { reason }) => {
                    tracing::debug!(
                        "Attempt {} failed: {}",
                        attempt + 1,
                        reason
                    );
                    last_reason = reason;

                    if attempt + 1 < self.max_attempts {
                        let delay = self.delay_for(attempt);
                        tracing::debug!("Retrying in {:.2}s", delay.as_secs_f64());
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(TerminalFailure::Exhausted {
            attempts: self.max_attempts,
            last_reason,
        })
    }
}

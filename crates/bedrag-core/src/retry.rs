//! Bounded retry with exponential backoff for remote service calls

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::Result;

/// Configuration for retry behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            multiplier: 2,
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryConfig {
    /// A single attempt, no retries
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. The last error is returned.
pub async fn retry_with_backoff<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = config.delay_for(attempt);
                warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            multiplier: 2,
            max_delay: Duration::from_millis(4),
        }
    }

    #[test]
    fn test_delay_schedule() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(1), Duration::from_millis(500));
        assert_eq!(config.delay_for(2), Duration::from_secs(1));
        assert_eq!(config.delay_for(3), Duration::from_secs(2));
        assert_eq!(config.delay_for(10), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_recovers_from_transient_errors() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = retry_with_backoff(&fast(), "test", move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(Error::Throttled("slow down".into()))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = retry_with_backoff(&fast(), "test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::Network("connection reset".into()))
        })
        .await;

        assert!(matches!(result, Err(Error::Network(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_fast() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = retry_with_backoff(&fast(), "test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::Authentication("invalid token".into()))
        })
        .await;

        assert!(matches!(result, Err(Error::Authentication(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_runs_once() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = retry_with_backoff(&RetryConfig::disabled(), "test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::Timeout("60s".into()))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

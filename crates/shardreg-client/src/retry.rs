//! Bounded retry around store operations.

use shardreg_core::{RegistryError, Result};
use std::future::Future;
use tracing::{debug, warn};

use crate::config::RetryConfig;

/// Runs a fallible store operation under a [`RetryConfig`].
///
/// Transient failures are retried after `attempt^2` delay units until the
/// attempt cap is reached, at which point the last error is returned wrapped
/// in [`RegistryError::RetryBudgetExhausted`]. Permanent failures are
/// returned immediately. There is no jitter, so nodes that fail together
/// retry together.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create an executor with the given policy
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The policy in use
    #[must_use]
    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `op` until it succeeds, fails permanently, or the budget runs out
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "store operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= max_attempts => {
                    warn!(operation, attempts = attempt, error = %err, "retry budget exhausted");
                    return Err(RegistryError::RetryBudgetExhausted {
                        operation,
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                Err(err) => {
                    let delay = self.config.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "store operation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast(max_attempts: u32) -> RetryExecutor {
        RetryExecutor::new(
            RetryConfig::new()
                .max_attempts(max_attempts)
                .delay_unit(Duration::ZERO),
        )
    }

    fn transient() -> RegistryError {
        RegistryError::RateLimited { retry_after: None }
    }

    #[tokio::test]
    async fn test_success_on_last_attempt() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = fast(25)
            .run("list", move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 25 {
                    Err(transient())
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 25);
        assert_eq!(calls.load(Ordering::SeqCst), 25);
    }

    #[tokio::test]
    async fn test_budget_exhausted_is_an_error() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<()> = fast(25)
            .run("upsert", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(RegistryError::Timeout("upsert".into()))
            })
            .await;

        match result.unwrap_err() {
            RegistryError::RetryBudgetExhausted {
                operation,
                attempts,
                source,
            } => {
                assert_eq!(operation, "upsert");
                assert_eq!(attempts, 25);
                assert!(matches!(*source, RegistryError::Timeout(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 25);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<()> = fast(25)
            .run("list", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(RegistryError::Unauthorized)
            })
            .await;

        assert!(matches!(result, Err(RegistryError::Unauthorized)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let result: Result<()> = fast(0)
            .run("list", || async { Err(transient()) })
            .await;

        assert!(matches!(
            result,
            Err(RegistryError::RetryBudgetExhausted { attempts: 1, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_quadratic() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let executor = RetryExecutor::new(RetryConfig::new().delay_unit(Duration::from_secs(1)));
        let start = tokio::time::Instant::now();

        executor
            .run("list", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                    Err(transient())
                } else {
                    Ok(())
                }
            })
            .await
            .unwrap();

        // 1 + 4 + 9 units between four attempts
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(14), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(15), "{elapsed:?}");
    }
}

//! Resilience layer
//!
//! Wraps one gateway invocation with a hard per-attempt timeout and a
//! bounded exponential-backoff retry loop. Only errors for which
//! [`GatewayError::is_retryable`] holds are re-attempted; the last error is
//! surfaced once retries are exhausted.

use crate::config::RetryPolicy;
use crate::ports::model_gateway::GatewayError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout + retry wrapper shared by every invocation of a run
#[derive(Debug, Clone)]
pub struct ResilienceLayer {
    timeout: Duration,
    policy: RetryPolicy,
}

impl ResilienceLayer {
    pub fn new(timeout: Duration, policy: RetryPolicy) -> Self {
        Self { timeout, policy }
    }

    /// Run `thunk` until it succeeds, fails fatally, or retries run out.
    ///
    /// `label` only appears in log lines.
    pub async fn call<T, F, Fut>(&self, label: &str, mut thunk: F) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let mut retry = 0u32;
        loop {
            let error = match tokio::time::timeout(self.timeout, thunk()).await {
                Ok(Ok(value)) => {
                    if retry > 0 {
                        debug!("{} succeeded after {} retries", label, retry);
                    }
                    return Ok(value);
                }
                Ok(Err(e)) => e,
                Err(_) => GatewayError::Timeout(self.timeout),
            };

            if !error.is_retryable() {
                debug!("{} failed with a non-retryable error: {}", label, error);
                return Err(error);
            }
            if retry >= self.policy.max_retries {
                warn!(
                    "{} failed after {} attempts: {}",
                    label,
                    retry + 1,
                    error
                );
                return Err(error);
            }

            retry += 1;
            let delay = self.policy.delay_for(retry);
            warn!(
                "{} failed ({}), retry {}/{} in {:?}",
                label, error, retry, self.policy.max_retries, delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Free-standing form of [`ResilienceLayer::call`]
pub async fn call<T, F, Fut>(
    thunk: F,
    timeout: Duration,
    policy: &RetryPolicy,
) -> Result<T, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    ResilienceLayer::new(timeout, policy.clone())
        .call("invocation", thunk)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn layer(max_retries: u32) -> ResilienceLayer {
        ResilienceLayer::new(
            Duration::from_secs(1),
            RetryPolicy::default().with_max_retries(max_retries),
        )
    }

    /// Fails with `error` for the first `failures` attempts, then succeeds
    fn flaky(
        attempts: Arc<AtomicU32>,
        failures: u32,
        error: GatewayError,
    ) -> impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = Result<u32, GatewayError>> + Send>>
    {
        move || {
            let attempts = Arc::clone(&attempts);
            let error = error.clone();
            Box::pin(async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= failures { Err(error) } else { Ok(n) }
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_is_attempted_once() {
        let attempts = Arc::new(AtomicU32::new(0));
        let result = layer(3)
            .call(
                "a",
                flaky(Arc::clone(&attempts), u32::MAX, GatewayError::Auth("bad key".into())),
            )
            .await;

        assert_eq!(result, Err(GatewayError::Auth("bad key".into())));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_is_attempted_max_retries_plus_one() {
        let attempts = Arc::new(AtomicU32::new(0));
        let started = Instant::now();
        let result = layer(2)
            .call(
                "a",
                flaky(Arc::clone(&attempts), u32::MAX, GatewayError::RateLimited("429".into())),
            )
            .await;

        assert!(matches!(result, Err(GatewayError::RateLimited(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // 500ms + 1000ms of backoff
        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert!(started.elapsed() < Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let attempts = Arc::new(AtomicU32::new(0));
        let result = layer(2)
            .call(
                "a",
                flaky(Arc::clone(&attempts), 1, GatewayError::Network("reset".into())),
            )
            .await;
        assert_eq!(result, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_call_becomes_timeout() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let result: Result<(), _> = layer(1)
            .call("a", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(())
                }
            })
            .await;

        assert_eq!(result, Err(GatewayError::Timeout(Duration::from_secs(1))));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_free_function_uses_given_policy() {
        let attempts = Arc::new(AtomicU32::new(0));
        let result = call(
            flaky(Arc::clone(&attempts), u32::MAX, GatewayError::Network("down".into())),
            Duration::from_secs(1),
            &RetryPolicy::none(),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}

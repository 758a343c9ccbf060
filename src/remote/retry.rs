use std::future::Future;
use std::time::Duration;
use tracing::warn;

use super::RemoteError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Retries without sleeping
    #[cfg(test)]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    /// Pause after the `attempt`-th failure: base, 2 * base, 4 * base, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Run `operation` until it succeeds, fails with a non-transient error, or
/// the policy's attempts are used up. The last error is returned as is.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut operation: F,
) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() || attempt >= policy.max_attempts => return Err(e),
            Err(e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "{what} failed (attempt {attempt}/{}): {e}; retrying in {delay:?}",
                    policy.max_attempts
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn unavailable() -> RemoteError {
        RemoteError::Status {
            url: "https://api.example/graphql".to_string(),
            status: 503,
        }
    }

    #[test]
    fn test_delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(4));
        assert_eq!(policy.delay_after(3), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = &AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::immediate(3), "lookup", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(unavailable())
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
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&RetryPolicy::immediate(3), "lookup", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(unavailable())
        })
        .await;
        assert!(matches!(result, Err(RemoteError::Status { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_graphql_errors_are_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&RetryPolicy::immediate(3), "lookup", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(RemoteError::GraphQl("bad query".to_string()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

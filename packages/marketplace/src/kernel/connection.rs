//! Waiting for the remote runtime connection.
//!
//! Establishing the initial connection is the one place where calls are
//! retried: the runtime is often still starting when the app boots. Ordinary
//! CRUD operations are never retried.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use typed_builder::TypedBuilder;

use super::traits::{BaseConnector, BaseRemoteRuntime};
use crate::common::RemoteError;

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 200;
const DEFAULT_MAX_BACKOFF_MS: u64 = 5_000;

/// Exponential backoff for connection attempts
#[derive(Debug, Clone, TypedBuilder)]
pub struct RetryPolicy {
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    #[builder(default = Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS))]
    pub initial_backoff: Duration,
    #[builder(default = Duration::from_millis(DEFAULT_MAX_BACKOFF_MS))]
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryPolicy {
    /// Delay after the `attempt`-th failure (1-based): `initial * 2^(attempt-1)`,
    /// capped at `max_backoff`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

/// Connect, retrying with exponential backoff.
///
/// Returns the last connector error once `max_attempts` is exhausted.
pub async fn connect_with_retry(
    connector: &dyn BaseConnector,
    policy: &RetryPolicy,
) -> Result<Arc<dyn BaseRemoteRuntime>, RemoteError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match connector.connect().await {
            Ok(runtime) => {
                tracing::info!(attempt, "Connected to remote runtime");
                return Ok(runtime);
            }
            Err(e) if attempt < max_attempts => {
                let delay = policy.backoff_for(attempt);
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Failed to connect to remote runtime, retrying..."
                );
                sleep(delay).await;
            }
            Err(e) => {
                tracing::error!(error = %e, attempts = attempt, "Failed to connect after all retries");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::{InMemoryConnector, InMemoryRuntime};

    #[test]
    fn backoff_doubles_until_capped() {
        let policy = RetryPolicy::builder()
            .initial_backoff(Duration::from_millis(100))
            .max_backoff(Duration::from_millis(500))
            .build();

        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(400));
        assert_eq!(policy.backoff_for(4), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(40), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn connects_after_transient_failures() {
        let runtime = Arc::new(InMemoryRuntime::new());
        let connector = InMemoryConnector::new(runtime).failing_times(2);
        let policy = RetryPolicy::builder().max_attempts(3).build();

        let started = tokio::time::Instant::now();
        let connected = connect_with_retry(&connector, &policy).await;

        assert!(connected.is_ok());
        assert_eq!(connector.attempts(), 3);
        // 200ms + 400ms of backoff
        assert!(started.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let runtime = Arc::new(InMemoryRuntime::new());
        let connector = InMemoryConnector::new(runtime).failing_times(10);
        let policy = RetryPolicy::builder().max_attempts(2).build();

        let result = connect_with_retry(&connector, &policy).await;

        assert!(matches!(result, Err(RemoteError::NotConnected)));
        assert_eq!(connector.attempts(), 2);
    }
}

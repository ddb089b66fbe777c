//! Wait-for-confirmation primitive.
//!
//! Writes to the remote runtime become visible to reads eventually, not
//! immediately. Before issuing a write that depends on an earlier one (for
//! example approving a just-suggested entity), poll until the earlier write
//! is observable instead of sleeping for a fixed time.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use typed_builder::TypedBuilder;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct ConfirmOptions {
    #[builder(default = Duration::from_millis(DEFAULT_TIMEOUT_MS))]
    pub timeout: Duration,
    #[builder(default = Duration::from_millis(DEFAULT_INTERVAL_MS))]
    pub interval: Duration,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfirmError<E> {
    #[error("not confirmed after {attempts} attempts ({waited:?})")]
    TimedOut { attempts: u32, waited: Duration },

    #[error("confirmation probe failed: {0}")]
    Probe(E),
}

/// Poll `probe` until it yields `Some`, fails, or the timeout elapses.
///
/// The probe runs at least once, even with a zero timeout.
pub async fn wait_for<T, E, F, Fut>(options: ConfirmOptions, mut probe: F) -> Result<T, ConfirmError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let started = Instant::now();
    let deadline = started + options.timeout;
    let mut attempts = 0;

    loop {
        attempts += 1;
        match probe().await {
            Ok(Some(value)) => {
                tracing::debug!(attempts, "Confirmed");
                return Ok(value);
            }
            Ok(None) => {}
            Err(e) => return Err(ConfirmError::Probe(e)),
        }

        if Instant::now() + options.interval > deadline {
            return Err(ConfirmError::TimedOut {
                attempts,
                waited: started.elapsed(),
            });
        }
        sleep(options.interval).await;
    }
}

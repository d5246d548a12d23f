//! Interval-driven refresh loop
//!
//! Each data source polls on its own cadence. A failed cycle (timeout,
//! vendor error, missing signing key) is logged and skipped; the next tick
//! tries again. The store imposes no retry of its own.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::error;

use crate::client::{ApiError, ApiResult};

/// Observation, air quality and warning cadence.
pub const OBSERVATION_INTERVAL: Duration = Duration::from_secs(600);
/// Daily and hourly forecast cadence.
pub const FORECAST_INTERVAL: Duration = Duration::from_secs(1800);
/// Life-suggestion cadence.
pub const SUGGESTION_INTERVAL: Duration = Duration::from_secs(7200);

/// Spawn a poll loop that invokes `refresh` every `interval`.
///
/// The first tick fires immediately. The handle aborts the loop when the
/// owning integration is unloaded.
pub fn spawn_updater<F, Fut>(name: &'static str, interval: Duration, mut refresh: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ApiResult<()>> + Send,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match refresh().await {
                Ok(()) => {}
                Err(ApiError::MissingKey) => {
                    error!(source = name, "poll skipped, no signing key available");
                }
                Err(err) => {
                    error!(source = name, %err, "poll cycle failed, retrying on next tick");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_updater_ticks_on_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);

        let handle = spawn_updater("test", Duration::from_secs(60), move || {
            let counted = Arc::clone(&counted);
            async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        // First tick is immediate, then once per interval.
        tokio::time::sleep(Duration::from_secs(150)).await;
        handle.abort();

        assert!(calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_updater_keeps_going_after_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);

        let handle = spawn_updater("test", Duration::from_secs(60), move || {
            let counted = Arc::clone(&counted);
            async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::MissingKey)
            }
        });

        tokio::time::sleep(Duration::from_secs(150)).await;
        handle.abort();

        assert!(calls.load(Ordering::SeqCst) >= 3);
    }
}

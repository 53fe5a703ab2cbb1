//! Polling for long-running video operations.

use std::future::Future;
use std::time::Duration;

use crate::error::{StudioError, StudioResult};

/// Re-fetch a job until `is_done` holds, sleeping `interval` between fetches.
/// Gives up with `OperationTimeout` after `max_polls` fetches that were not done.
pub async fn poll_until_done<T, F, Fut, D>(
    interval: Duration,
    max_polls: u32,
    mut fetch: F,
    is_done: D,
) -> StudioResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StudioResult<T>>,
    D: Fn(&T) -> bool,
{
    for attempt in 1..=max_polls {
        tokio::time::sleep(interval).await;
        let state = fetch().await?;
        if is_done(&state) {
            return Ok(state);
        }
        tracing::debug!(attempt, max_polls, "operation still running");
    }
    Err(StudioError::OperationTimeout { polls: max_polls })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn returns_once_done() {
        let calls = Cell::new(0u32);
        let out = poll_until_done(
            Duration::ZERO,
            5,
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { Ok(n) }
            },
            |n| *n >= 3,
        )
        .await
        .unwrap();
        assert_eq!(out, 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn times_out_after_max_polls() {
        let err = poll_until_done(Duration::ZERO, 2, || async { Ok(false) }, |done| *done)
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::OperationTimeout { polls: 2 }));
    }

    #[tokio::test]
    async fn fetch_error_propagates() {
        let err = poll_until_done(
            Duration::ZERO,
            3,
            || async { Err::<bool, _>(StudioError::Collaborator("boom".into())) },
            |done| *done,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StudioError::Collaborator(_)));
    }
}

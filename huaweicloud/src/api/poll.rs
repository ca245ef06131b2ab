//! Generic status polling
//!
//! Asynchronous provisioning on HuaweiCloud hands back a resource (or job)
//! whose `status` field moves through a small set of states. Every resource
//! drives the same loop: refresh, compare against pending/target states,
//! sleep, repeat until the target is reached or the timeout expires.

use std::future::Future;
use std::time::Duration;

use super::error::ApiError;

/// A state the refresh function can report without ending the wait.
#[derive(Debug, Clone)]
pub struct StateWait<'a> {
    /// States the wait tolerates while in progress.
    pub pending: &'a [&'a str],
    /// States that complete the wait successfully.
    pub target: &'a [&'a str],
    /// Initial delay before the first refresh.
    pub delay: Duration,
    /// Interval between refreshes.
    pub interval: Duration,
    /// Overall deadline for the wait.
    pub timeout: Duration,
}

impl Default for StateWait<'_> {
    fn default() -> Self {
        Self {
            pending: &[],
            target: &[],
            delay: Duration::from_secs(10),
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(1800),
        }
    }
}

/// Special state returned by refresh functions when the resource is gone.
///
/// Waits that target deletion list it in `target`; all other waits treat it
/// as an unexpected state.
pub const STATE_DELETED: &str = "DELETED";

/// Poll `refresh` until it reports one of `wait.target`.
///
/// States in `wait.pending` keep the loop going; anything else fails the
/// wait immediately so that misprovisioned resources surface as errors
/// rather than hanging until the timeout.
pub async fn wait_for_state<F, Fut>(wait: StateWait<'_>, mut refresh: F) -> Result<(), ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, ApiError>>,
{
    tokio::time::sleep(wait.delay).await;

    let deadline = tokio::time::Instant::now() + wait.timeout;
    let mut last_state = String::new();

    loop {
        let state = refresh().await?;

        if wait.target.iter().any(|t| *t == state) {
            return Ok(());
        }
        if !wait.pending.iter().any(|p| *p == state) {
            return Err(ApiError::UnexpectedState {
                state,
                reason: format!("expected one of {:?}", wait.target),
            });
        }

        last_state = state;

        if tokio::time::Instant::now() + wait.interval > deadline {
            return Err(ApiError::WaitTimeout {
                target: wait.target.join("/"),
                last: last_state,
            });
        }
        tokio::time::sleep(wait.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_wait<'a>(pending: &'a [&'a str], target: &'a [&'a str]) -> StateWait<'a> {
        StateWait {
            pending,
            target,
            delay: Duration::from_millis(1),
            interval: Duration::from_millis(1),
            timeout: Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn reaches_target_after_pending_states() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = wait_for_state(fast_wait(&["BUILD"], &["ACTIVE"]), move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok(if n < 3 { "BUILD".to_string() } else { "ACTIVE".to_string() })
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn unexpected_state_fails_immediately() {
        let result = wait_for_state(fast_wait(&["BUILD"], &["ACTIVE"]), || async {
            Ok("ERROR".to_string())
        })
        .await;
        match result {
            Err(ApiError::UnexpectedState { state, .. }) => assert_eq!(state, "ERROR"),
            other => panic!("expected UnexpectedState, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn times_out_when_state_never_converges() {
        let result = wait_for_state(fast_wait(&["BUILD"], &["ACTIVE"]), || async {
            Ok("BUILD".to_string())
        })
        .await;
        match result {
            Err(ApiError::WaitTimeout { last, .. }) => assert_eq!(last, "BUILD"),
            other => panic!("expected WaitTimeout, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn refresh_errors_propagate() {
        let result: Result<(), ApiError> =
            wait_for_state(fast_wait(&["BUILD"], &["ACTIVE"]), || async {
                Err(ApiError::ServiceUnavailable)
            })
            .await;
        assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
    }
}

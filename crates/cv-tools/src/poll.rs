//! Bounded polling for long-running remote operations

use crate::error::{ToolError, ToolResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Poll `probe` at `interval` until it yields a value, fails, or the
/// wall-clock `timeout` elapses.
///
/// `probe` returns `Ok(None)` while the remote operation is still running.
/// The timeout is checked before sleeping, so the loop never waits past
/// the deadline just to discover it has expired.
pub async fn poll_until<T, F, Fut>(
    operation: &str,
    interval: Duration,
    timeout: Duration,
    mut probe: F,
) -> ToolResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ToolResult<Option<T>>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        if Instant::now() + interval > deadline {
            return Err(ToolError::Timeout {
                operation: operation.to_string(),
                seconds: timeout.as_secs(),
            });
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_poll_until_succeeds_after_retries() {
        let attempts = AtomicUsize::new(0);

        let result = poll_until(
            "test operation",
            Duration::from_millis(1),
            Duration::from_secs(5),
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move { Ok(if n >= 2 { Some(n) } else { None }) }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let result: ToolResult<()> = poll_until(
            "stuck operation",
            Duration::from_millis(5),
            Duration::from_millis(12),
            || async { Ok(None) },
        )
        .await;

        assert!(matches!(result.unwrap_err(), ToolError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_poll_until_propagates_probe_error() {
        let result: ToolResult<()> = poll_until(
            "broken operation",
            Duration::from_millis(1),
            Duration::from_secs(5),
            || async {
                Err(ToolError::OperationFailed {
                    operation: "probe".into(),
                    message: "boom".into(),
                })
            },
        )
        .await;

        assert!(matches!(
            result.unwrap_err(),
            ToolError::OperationFailed { .. }
        ));
    }
}

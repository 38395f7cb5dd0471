//! Bounded exponential-backoff retry around fallible async operations.

use std::future::Future;

use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::error::{CompareError, CompareResult};
use crate::types::RetryPolicy;

/// Invoke `op` up to `policy.max_attempts` times, sleeping the policy's
/// backoff between attempts.
///
/// Every error class is retried identically — timeouts, transport failures
/// and endpoint-reported errors alike. Backoff sleeps and in-flight attempts
/// are raced against the cancellation token, so a task parked here observes
/// shutdown at its next suspension point. On exhaustion the last observed
/// error is surfaced annotated with the attempt count.
pub async fn execute_with_retry<T, F, Fut>(
    desc: &str,
    policy: &RetryPolicy,
    token: &CancellationToken,
    mut op: F,
) -> CompareResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CompareResult<T>>,
{
    let mut last_error: Option<CompareError> = None;

    for attempt in 1..=policy.max_attempts {
        if token.is_cancelled() {
            return Err(CompareError::Cancelled);
        }

        let result = tokio::select! {
            _ = token.cancelled() => return Err(CompareError::Cancelled),
            result = op() => result,
        };

        match result {
            Ok(value) => return Ok(value),
            Err(CompareError::Cancelled) => return Err(CompareError::Cancelled),
            Err(err) => {
                if attempt < policy.max_attempts {
                    let delay = policy.backoff_for_attempt(attempt);
                    debug!(
                        "retrying {} ({}/{}) after error: {}",
                        desc, attempt, policy.max_attempts, err
                    );
                    tokio::select! {
                        _ = token.cancelled() => return Err(CompareError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                } else {
                    warn!(
                        "failed to fetch {} after {} attempts: {}",
                        desc, policy.max_attempts, err
                    );
                }
                last_error = Some(err);
            }
        }
    }

    Err(CompareError::RetryExhausted {
        attempts: policy.max_attempts,
        last: last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "no attempts were made".to_string()),
    })
}

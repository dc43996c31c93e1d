//! Generic retry loop with exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;

use super::RetryOptions;
use crate::time::Sleeper;
use crate::{SdkError, SdkResult};

/// Lower bound of the multiplicative jitter band.
pub const JITTER_MIN: f64 = 0.8;

/// Upper bound of the multiplicative jitter band.
pub const JITTER_MAX: f64 = 1.2;

/// Runs `operation` until it succeeds, fails terminally, or the retry
/// budget is spent.
///
/// Attempts are strictly sequential. Before each attempt the cancellation
/// signal (if any) is checked; an in-flight attempt is never preempted.
///
/// # Backoff
///
/// The wait starts at `options.delay`. After each retryable failure it
/// becomes `min(wait * backoff_factor, max_delay)` scaled by a random factor
/// in `[0.8, 1.2]`; the jittered value is the base for the next step. A
/// numeric `retry-after` header on the error replaces the computed wait
/// entirely, without jitter.
///
/// # Errors
///
/// - The operation's last error, unmodified, when it is not retryable or
///   the final attempt failed
/// - [`SdkError::Cancelled`] when the signal is set before an attempt
/// - [`SdkError::MaxAttemptsReached`] when `max_number_of_retries` is negative
///
/// # Example
///
/// ```
/// use merchant_sdk::retry::{RetryOptions, with_retry};
/// use merchant_sdk::time::InstantSleeper;
///
/// # async fn example() -> merchant_sdk::SdkResult<()> {
/// let value = with_retry(|| async { Ok(42) }, &RetryOptions::new(), &InstantSleeper).await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
pub async fn with_retry<T, F, Fut, S>(
    mut operation: F,
    options: &RetryOptions,
    sleeper: &S,
) -> SdkResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SdkResult<T>>,
    S: Sleeper,
{
    let mut attempt: i64 = 0;
    let max_retries = i64::from(options.max_number_of_retries);
    let mut wait = options.delay;

    while attempt <= max_retries {
        if options
            .signal
            .as_ref()
            .is_some_and(tokio_util::sync::CancellationToken::is_cancelled)
        {
            tracing::debug!(attempt, "Retry loop cancelled before attempt");
            return Err(SdkError::Cancelled);
        }

        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let retryable = options.should_retry(&error);
        if attempt == max_retries || !retryable {
            if retryable {
                tracing::warn!(
                    attempts = attempt + 1,
                    status = error.status(),
                    "Giving up after exhausting retries: {error}"
                );
            }
            return Err(error);
        }

        let attempt_number = u32::try_from(attempt + 1).unwrap_or(u32::MAX);
        if let Some(observer) = &options.on_retry {
            observer(attempt_number, &error);
        }

        wait = match error.retry_after() {
            Some(hint) => hint,
            None => apply_jitter(options.next_backoff(wait), rand::random::<f64>()),
        };

        tracing::debug!(
            attempt = attempt_number,
            status = error.status(),
            wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            "Retrying after failure: {error}"
        );

        sleeper.sleep(wait).await;
        attempt += 1;
    }

    Err(SdkError::MaxAttemptsReached)
}

/// Scales `wait` into the jitter band using a unit sample in `[0, 1)`.
///
/// Saturates at [`Duration::MAX`] instead of overflowing.
#[must_use]
pub fn apply_jitter(wait: Duration, unit_sample: f64) -> Duration {
    let factor = unit_sample
        .clamp(0.0, 1.0)
        .mul_add(JITTER_MAX - JITTER_MIN, JITTER_MIN);
    Duration::try_from_secs_f64(wait.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

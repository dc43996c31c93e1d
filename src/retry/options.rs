//! Retry configuration.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::SdkError;
use crate::config::defaults;

/// Predicate deciding whether an error is worth another attempt.
pub type RetryPredicate = Arc<dyn Fn(&SdkError) -> bool + Send + Sync>;

/// Observer invoked before each retry with the 1-based number of the
/// attempt that just failed.
pub type RetryObserver = Arc<dyn Fn(u32, &SdkError) + Send + Sync>;

/// Configuration for exponential backoff retry behavior.
///
/// Constructed once per client by merging [`RetryOverrides`] over the
/// defaults, then shared read-only across calls.
///
/// # Defaults
///
/// - `max_number_of_retries`: 3 (so 4 attempts in total)
/// - `delay`: 1 second
/// - `backoff_factor`: 2.0
/// - `max_delay`: 30 seconds
/// - `retry_on_status`: 408, 429, 500, 502, 503, 504
/// - `retry_on_error`: network errors only
///
/// # Example
///
/// ```
/// use merchant_sdk::retry::RetryOptions;
/// use std::time::Duration;
///
/// let options = RetryOptions::new()
///     .with_max_number_of_retries(5)
///     .with_delay(Duration::from_millis(200))
///     .with_retry_on_status([503]);
/// assert_eq!(options.max_number_of_retries, 5);
/// ```
///
/// [`RetryOverrides`]: crate::config::RetryOverrides
#[derive(Clone)]
pub struct RetryOptions {
    /// Retries after the first attempt.
    ///
    /// `0` means exactly one attempt. A negative value means no attempt is
    /// made at all and [`SdkError::MaxAttemptsReached`] is returned.
    pub max_number_of_retries: i32,

    /// Base wait before backoff growth is applied.
    pub delay: Duration,

    /// Multiplier applied to the wait after each failed attempt.
    pub backoff_factor: f64,

    /// Cap on the computed backoff wait (not on `retry-after` hints).
    pub max_delay: Duration,

    /// HTTP status codes that are retryable.
    pub retry_on_status: BTreeSet<u16>,

    /// Additional retry predicate, consulted when the status is not listed.
    pub retry_on_error: RetryPredicate,

    /// Optional observer called before every retry.
    pub on_retry: Option<RetryObserver>,

    /// Optional cancellation signal checked before each attempt.
    pub signal: Option<CancellationToken>,
}

impl RetryOptions {
    /// Creates retry options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_number_of_retries: defaults::RETRY_MAX_NUMBER_OF_RETRIES,
            delay: defaults::retry_delay(),
            backoff_factor: defaults::RETRY_BACKOFF_FACTOR,
            max_delay: defaults::retry_max_delay(),
            retry_on_status: defaults::RETRY_ON_STATUS.iter().copied().collect(),
            retry_on_error: Arc::new(SdkError::is_network),
            on_retry: None,
            signal: None,
        }
    }

    /// Sets the number of retries after the first attempt.
    #[must_use]
    pub const fn with_max_number_of_retries(mut self, retries: i32) -> Self {
        self.max_number_of_retries = retries;
        self
    }

    /// Sets the base delay.
    ///
    /// Zero delay is supported (useful for testing) but creates a tight
    /// retry loop in production.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the backoff factor.
    ///
    /// # Panics
    ///
    /// Panics if `factor` is not positive (must be > 0.0).
    #[must_use]
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        assert!(factor > 0.0, "backoff_factor must be positive");
        self.backoff_factor = factor;
        self
    }

    /// Sets the cap on computed backoff waits.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Replaces the set of retryable status codes.
    #[must_use]
    pub fn with_retry_on_status(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retry_on_status = statuses.into_iter().collect();
        self
    }

    /// Replaces the retry predicate.
    #[must_use]
    pub fn with_retry_on_error(
        mut self,
        predicate: impl Fn(&SdkError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.retry_on_error = Arc::new(predicate);
        self
    }

    /// Registers a retry observer.
    #[must_use]
    pub fn with_on_retry(
        mut self,
        observer: impl Fn(u32, &SdkError) + Send + Sync + 'static,
    ) -> Self {
        self.on_retry = Some(Arc::new(observer));
        self
    }

    /// Attaches a cancellation signal.
    #[must_use]
    pub fn with_signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Returns true if the error should trigger another attempt.
    ///
    /// The status check and the predicate are OR-ed.
    #[must_use]
    pub fn should_retry(&self, error: &SdkError) -> bool {
        let status_listed = error
            .status()
            .is_some_and(|status| self.retry_on_status.contains(&status));
        status_listed || (self.retry_on_error)(error)
    }

    /// Computes the next backoff wait from the current one, before jitter.
    ///
    /// Saturates at `max_delay` when the product is not representable.
    #[must_use]
    pub fn next_backoff(&self, current: Duration) -> Duration {
        let grown = current.as_secs_f64() * self.backoff_factor;
        let capped = grown.min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped.max(0.0)).unwrap_or(self.max_delay)
    }

    /// Returns the total number of attempts these options allow.
    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        u32::try_from(self.max_number_of_retries).map_or(0, |retries| retries.saturating_add(1))
    }
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RetryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_number_of_retries", &self.max_number_of_retries)
            .field("delay", &self.delay)
            .field("backoff_factor", &self.backoff_factor)
            .field("max_delay", &self.max_delay)
            .field("retry_on_status", &self.retry_on_status)
            .field("on_retry", &self.on_retry.is_some())
            .field("signal", &self.signal.is_some())
            .finish_non_exhaustive()
    }
}

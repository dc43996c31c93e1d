//! Time abstractions for testability.
//!
//! This module provides:
//! - [`Clock`] for reading wall-clock time (token expiry bookkeeping)
//! - [`Sleeper`] for waiting between retry attempts
//!
//! Production code uses [`SystemClock`] and [`TokioSleeper`]; tests inject
//! controlled implementations such as [`InstantSleeper`].

use std::future::Future;
use std::time::{Duration, SystemTime};

/// Abstraction over system time for testability.
///
/// # Example
///
/// ```
/// use merchant_sdk::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// assert!(clock.now_millis() > 0);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;

    /// Returns the current time as milliseconds since the Unix epoch.
    ///
    /// Pre-epoch times collapse to 0.
    fn now_millis(&self) -> u64 {
        self.now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Production clock using actual system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Abstraction over asynchronous waiting.
///
/// The retry engine sleeps through this trait so tests can observe the
/// computed waits without actually waiting.
pub trait Sleeper: Send + Sync {
    /// Waits for the given duration.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately.
///
/// Useful in tests that exercise retry paths without real delays.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

impl<T: Sleeper> Sleeper for std::sync::Arc<T> {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        (**self).sleep(duration)
    }
}

impl<T: Clock> Clock for std::sync::Arc<T> {
    fn now(&self) -> SystemTime {
        (**self).now()
    }
}

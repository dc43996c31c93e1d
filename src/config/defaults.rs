//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default base URL of the sandbox environment.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.api.merchant-pay.com";

/// Default base URL of the production environment.
pub const PRODUCTION_BASE_URL: &str = "https://api.merchant-pay.com";

/// Default number of retries after the first attempt.
pub const RETRY_MAX_NUMBER_OF_RETRIES: i32 = 3;

/// Default base retry delay in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1_000;

/// Default retry backoff factor.
pub const RETRY_BACKOFF_FACTOR: f64 = 2.0;

/// Default cap on backoff waits in milliseconds.
pub const RETRY_MAX_DELAY_MS: u64 = 30_000;

/// HTTP status codes retried by default.
pub const RETRY_ON_STATUS: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// A cached token is renewed once it is this close to expiry.
pub const TOKEN_REFRESH_MARGIN_MS: u64 = 60_000;

/// Default base retry delay as Duration.
#[must_use]
pub const fn retry_delay() -> Duration {
    Duration::from_millis(RETRY_DELAY_MS)
}

/// Default maximum retry delay as Duration.
#[must_use]
pub const fn retry_max_delay() -> Duration {
    Duration::from_millis(RETRY_MAX_DELAY_MS)
}

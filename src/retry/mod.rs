//! Retry layer wrapping every network call.
//!
//! This module provides:
//! - Retry configuration ([`RetryOptions`])
//! - The retry loop itself ([`with_retry`])

mod engine;
mod options;


pub use engine::{JITTER_MAX, JITTER_MIN, apply_jitter, with_retry};
pub use options::{RetryObserver, RetryOptions, RetryPredicate};

//! Configuration layer for the SDK.
//!
//! This module provides:
//! - TOML configuration file parsing ([`FileConfig`])
//! - Validated client configuration ([`ClientConfig`])
//! - Partial retry overrides ([`RetryOverrides`])
//! - Default values ([`defaults`])
//!
//! # Retry overrides
//!
//! Overrides are merged over the built-in defaults exactly once, when a
//! client is constructed. The resulting [`RetryOptions`] value is then
//! shared read-only by every resource wrapper of that client.
//!
//! [`RetryOptions`]: crate::retry::RetryOptions

mod client;
pub mod defaults;
mod error;
mod file;


pub use client::{ClientConfig, RetryOverrides};
pub use error::{ConfigError, field};
pub use file::{ClientSection, FileConfig, RetrySection};

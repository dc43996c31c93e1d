//! Merchant SDK: client library for the merchant payments API.
//!
//! Cached client-credentials tokens, retries with exponential backoff and
//! jitter, HMAC webhook verification and typed resource wrappers.

pub mod auth;
pub mod client;
pub mod config;
pub mod environment;
mod error;
pub mod resources;
pub mod retry;
pub mod time;
pub mod transport;
pub mod webhook;

pub use client::MerchantClient;
pub use config::ClientConfig;
pub use environment::Environment;
pub use error::{BoxError, EnvironmentError, HttpError, SdkError, SdkResult};

//! HTTP transport layer.
//!
//! This module provides types and traits for:
//! - Building HTTP requests ([`HttpRequest`])
//! - Handling HTTP responses ([`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])
//! - JSON calls with retries ([`Transport`], [`RequestConfig`])
//! - Query strings and endpoint URLs ([`QueryParams`], [`endpoint_url`])

mod client;
mod executor;
mod http;
mod query;

#[cfg(test)]
mod executor_tests;

pub use client::ReqwestClient;
pub use executor::{RequestConfig, SDK_VERSION_HEADER, Transport, sdk_version};
pub use self::http::{HttpClient, HttpRequest, HttpResponse};
pub use query::{QueryParams, build_query_string, endpoint_url, path_segment};

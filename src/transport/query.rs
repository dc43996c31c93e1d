//! Query string and endpoint URL construction.

use std::fmt::Display;

use url::Url;
use url::form_urlencoded::byte_serialize;

use crate::{SdkError, SdkResult};

/// Ordered query parameters where absent values are skipped.
///
/// Only scalar values (anything implementing [`Display`]) are accepted;
/// lists and nested objects have no encoding here.
///
/// # Example
///
/// ```
/// use merchant_sdk::transport::{QueryParams, build_query_string};
///
/// let params = QueryParams::new()
///     .push("limit", Some(10))
///     .push("cursor", None::<&str>)
///     .push("email", Some("a b@example.com"));
///
/// assert_eq!(build_query_string(&params), "?limit=10&email=a%20b%40example.com");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    /// Creates an empty parameter list.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Appends a parameter; `None` values are kept but never emitted.
    #[must_use]
    pub fn push<V: Display>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.pairs.push((key.into(), value.map(|v| v.to_string())));
        self
    }

    /// Appends a parameter that is always present.
    #[must_use]
    pub fn set<V: Display>(self, key: impl Into<String>, value: V) -> Self {
        self.push(key, Some(value))
    }

    /// Iterates over the defined parameters in insertion order.
    pub fn defined(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    /// Returns true if no parameter has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defined().next().is_none()
    }
}

/// Percent-encodes `raw`; a space becomes `%20`, never `+`.
fn encode(raw: &str) -> String {
    // Form encoding escapes a literal '+' as %2B, so any '+' left is a space.
    byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Renders `?k=v&...` from the defined parameters, percent-encoded.
///
/// Returns an empty string, not a bare `?`, when nothing is defined.
#[must_use]
pub fn build_query_string(params: &QueryParams) -> String {
    let rendered: Vec<String> = params
        .defined()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect();

    if rendered.is_empty() {
        return String::new();
    }
    format!("?{}", rendered.join("&"))
}

/// Joins `base`, an absolute API `path`, and the query string.
///
/// Any path prefix on `base` is preserved.
///
/// # Errors
///
/// Returns an error if the combined URL does not parse.
pub fn endpoint_url(base: &Url, path: &str, params: &QueryParams) -> SdkResult<Url> {
    let raw = format!(
        "{}/{}{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/'),
        build_query_string(params)
    );

    Url::parse(&raw).map_err(|e| SdkError::wrap(format!("Invalid endpoint URL '{raw}'"), e))
}

/// Percent-encodes a single path segment such as a resource id.
#[must_use]
pub fn path_segment(raw: &str) -> String {
    encode(raw)
}

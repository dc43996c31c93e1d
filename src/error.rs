//! Error types shared by every layer of the SDK.

use std::time::Duration;

use thiserror::Error;

/// Boxed error used to preserve an underlying cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used across the SDK.
///
/// Every fallible SDK operation returns this instead of panicking.
pub type SdkResult<T> = Result<T, SdkError>;

/// Error type for SDK operations.
///
/// Distinguishes transport failures from API-level failures so the retry
/// engine can classify them independently.
#[derive(Debug, Error)]
pub enum SdkError {
    /// No response was received (DNS, connection refused, TLS, timeout).
    ///
    /// Retried by the default retry predicate.
    #[error("Network error: {message}")]
    Network {
        /// Human-readable description
        message: String,
        /// Underlying transport error
        #[source]
        source: Option<BoxError>,
    },

    /// The server answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: http::StatusCode,
        /// Message extracted from the body, or the canonical reason
        message: String,
        /// Parsed response body (a JSON string when the body was not JSON)
        body: serde_json::Value,
        /// Response headers
        headers: http::HeaderMap,
    },

    /// The response body could not be decoded as JSON.
    #[error("Failed to parse response: {message}")]
    Parse {
        /// Human-readable description
        message: String,
        /// Underlying decode error
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Catch-all SDK error with an optional status tag and cause.
    #[error("{message}")]
    Sdk {
        /// Human-readable description
        message: String,
        /// Optional HTTP-style status code
        status: Option<u16>,
        /// Original cause
        #[source]
        source: Option<BoxError>,
    },

    /// The operation is not permitted in the resolved environment.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// The cancellation signal was set before an attempt started.
    #[error("Operation was cancelled")]
    Cancelled,

    /// The retry loop exited without a terminal result.
    #[error("Maximum retry attempts reached")]
    MaxAttemptsReached,
}

impl SdkError {
    /// Creates a generic SDK error with a message.
    #[must_use]
    pub fn sdk(message: impl Into<String>) -> Self {
        Self::Sdk {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates a generic SDK error tagged with a status code.
    #[must_use]
    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self::Sdk {
            message: message.into(),
            status: Some(status),
            source: None,
        }
    }

    /// Wraps an unexpected error, preserving it as the cause.
    #[must_use]
    pub fn wrap(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Sdk {
            message: message.into(),
            status: None,
            source: Some(source.into()),
        }
    }

    /// Returns the status code carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(status.as_u16()),
            Self::Sdk { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns true for transport-level failures.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns the parsed response body of an API error.
    #[must_use]
    pub const fn body(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns the server's `retry-after` hint in whole seconds.
    ///
    /// Only numeric values are honoured; HTTP-date values yield `None`.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        let Self::Api { headers, .. } = self else {
            return None;
        };
        let value = headers.get(http::header::RETRY_AFTER)?.to_str().ok()?;
        value.trim().parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Error type for low-level HTTP operations.
///
/// Describes what went wrong without dictating recovery strategy.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and TLS errors.
    #[error("Connection error: {0}")]
    Connection(#[source] BoxError),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    ///
    /// This typically indicates a configuration error rather than
    /// a transient failure.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<HttpError> for SdkError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Connection(_) | HttpError::Timeout => Self::Network {
                message: error.to_string(),
                source: Some(Box::new(error)),
            },
            HttpError::InvalidUrl(reason) => Self::Sdk {
                message: format!("Invalid URL: {reason}"),
                status: None,
                source: None,
            },
        }
    }
}

/// Raised when an operation is refused in the current environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    /// A sandbox-only operation was invoked against production.
    #[error("Operation '{operation}' is only available in the sandbox environment")]
    ProductionRestricted {
        /// Name of the refused operation
        operation: &'static str,
    },
}

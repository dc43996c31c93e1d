//! JSON request executor driving every call through the retry engine.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::{HttpClient, HttpRequest, HttpResponse};
use crate::retry::{RetryOptions, with_retry};
use crate::time::{Sleeper, TokioSleeper};
use crate::{SdkError, SdkResult};

/// Header carrying the client version on every request.
pub const SDK_VERSION_HEADER: &str = "x-sdk-version";

/// Value of [`SDK_VERSION_HEADER`].
#[must_use]
pub fn sdk_version() -> String {
    format!("merchant-sdk-rust/{}", env!("CARGO_PKG_VERSION"))
}

/// Per-call settings.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Extra headers; they win over the transport defaults on conflict.
    pub headers: http::HeaderMap,
    /// Retry options replacing the transport's for this call.
    pub retry: Option<RetryOptions>,
    /// Cancellation signal checked before each attempt.
    pub signal: Option<CancellationToken>,
}

impl RequestConfig {
    /// Creates an empty per-call configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header, replacing previous values for that name.
    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets `Authorization: Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token contains bytes not allowed in a header.
    pub fn with_bearer(self, token: &str) -> SdkResult<Self> {
        let mut value = http::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| SdkError::wrap("Access token is not a valid header value", e))?;
        value.set_sensitive(true);
        Ok(self.with_header(http::header::AUTHORIZATION, value))
    }

    /// Overrides the retry options for this call.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryOptions) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Attaches a cancellation signal.
    #[must_use]
    pub fn with_signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// JSON-over-HTTP executor with retries.
///
/// Each call builds one [`HttpRequest`] and hands a closure performing the
/// full exchange (send, decode, status check) to [`with_retry`], so a retry
/// repeats the whole request.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper used between attempts (defaults to [`TokioSleeper`])
#[derive(Debug)]
pub struct Transport<H, S = TokioSleeper> {
    client: H,
    sleeper: S,
    retry: RetryOptions,
}

impl<H> Transport<H, TokioSleeper> {
    /// Creates a transport sharing `retry` across every call.
    #[must_use]
    pub const fn new(client: H, retry: RetryOptions) -> Self {
        Self {
            client,
            sleeper: TokioSleeper,
            retry,
        }
    }
}

impl<H, S> Transport<H, S> {
    /// Sets a custom sleeper for retry delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> Transport<H, S2> {
        Transport {
            client: self.client,
            sleeper,
            retry: self.retry,
        }
    }

    /// Returns the default retry options.
    #[must_use]
    pub const fn retry_options(&self) -> &RetryOptions {
        &self.retry
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub const fn client(&self) -> &H {
        &self.client
    }
}

impl<H: HttpClient, S: Sleeper> Transport<H, S> {
    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// Returns the classified error once retries are exhausted or the
    /// failure is not retryable.
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: url::Url,
        config: &RequestConfig,
    ) -> SdkResult<T> {
        self.send(http::Method::GET, url, None, config).await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Transport::get`]; serialization failures are returned before
    /// any network traffic.
    pub async fn post<B, T>(&self, url: url::Url, body: &B, config: &RequestConfig) -> SdkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode_body(body)?;
        self.send(http::Method::POST, url, Some(body), config).await
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Transport::post`].
    pub async fn put<B, T>(&self, url: url::Url, body: &B, config: &RequestConfig) -> SdkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode_body(body)?;
        self.send(http::Method::PUT, url, Some(body), config).await
    }

    /// Sends a PATCH request.
    ///
    /// `None` sends no body at all, which is distinct from `Some(&{})`.
    ///
    /// # Errors
    ///
    /// See [`Transport::post`].
    pub async fn patch<B, T>(
        &self,
        url: url::Url,
        body: Option<&B>,
        config: &RequestConfig,
    ) -> SdkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body.map(encode_body).transpose()?;
        self.send(http::Method::PATCH, url, body, config).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`Transport::get`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        url: url::Url,
        config: &RequestConfig,
    ) -> SdkResult<T> {
        self.send(http::Method::DELETE, url, None, config).await
    }

    /// Sends a request with an already encoded body.
    ///
    /// # Errors
    ///
    /// See [`Transport::get`].
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: http::Method,
        url: url::Url,
        body: Option<Vec<u8>>,
        config: &RequestConfig,
    ) -> SdkResult<T> {
        let request = build_request(method, url, body, config);

        let mut options = config.retry.as_ref().unwrap_or(&self.retry).clone();
        if let Some(signal) = &config.signal {
            options.signal = Some(signal.clone());
        }

        let request = &request;
        let attempt = move || self.execute_once::<T>(request);
        with_retry(attempt, &options, &self.sleeper).await
    }

    /// Executes a single attempt and classifies its outcome.
    async fn execute_once<T: DeserializeOwned>(&self, request: &HttpRequest) -> SdkResult<T> {
        tracing::debug!(method = %request.method, url = %request.url, "Sending request");

        let response = self.client.request(request.clone()).await?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = response.status.as_u16(),
            "Received response"
        );

        if !response.is_success() {
            return Err(api_error(response));
        }

        decode_body(&response.body)
    }
}

fn build_request(
    method: http::Method,
    url: url::Url,
    body: Option<Vec<u8>>,
    config: &RequestConfig,
) -> HttpRequest {
    let mut request = HttpRequest::new(method, url)
        .with_header(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        )
        .with_header(
            http::HeaderName::from_static(SDK_VERSION_HEADER),
            http::HeaderValue::from_str(&sdk_version())
                .unwrap_or_else(|_| http::HeaderValue::from_static("merchant-sdk-rust")),
        );

    // Caller headers replace defaults with the same name.
    request.headers.extend(config.headers.clone());
    request.body = body;
    request
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> SdkResult<Vec<u8>> {
    serde_json::to_vec(body).map_err(|e| SdkError::wrap("Failed to serialize request body", e))
}

/// Decodes a 2xx body; an empty body decodes as JSON `null`.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> SdkResult<T> {
    let decoded = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(body)
    };

    decoded.map_err(|e| SdkError::Parse {
        message: e.to_string(),
        source: Some(e),
    })
}

/// Builds an [`SdkError::Api`] from a non-2xx response.
fn api_error(response: HttpResponse) -> SdkError {
    let body = if response.body.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&response.body).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&response.body).into_owned())
        })
    };

    let message = ["message", "error_description", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(serde_json::Value::as_str))
        .map_or_else(
            || {
                response
                    .status
                    .canonical_reason()
                    .unwrap_or("Unexpected status")
                    .to_string()
            },
            ToString::to_string,
        );

    SdkError::Api {
        status: response.status,
        message,
        body,
        headers: response.headers,
    }
}

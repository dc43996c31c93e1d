//! Bearer token cache with transparent renewal.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::SdkResult;
use crate::config::defaults;
use crate::time::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::transport::{HttpClient, QueryParams, RequestConfig, Transport, endpoint_url};

/// Path of the client-credentials grant endpoint.
pub const TOKEN_GRANT_PATH: &str = "/api/v1/merchant/token/grant";

const GRANT_TYPE: &str = "client_credentials";

/// Body returned by the grant endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The bearer token
    pub access_token: String,
    /// Token type, normally `Bearer`
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime as declared by the server, added to the grant time as is
    pub expires_in: u64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Serialize)]
struct GrantRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at_ms: u64,
}

/// Holds one cached bearer token and renews it when absent or near expiry.
///
/// Each manager owns its cache; two clients with different credentials
/// never share tokens. Concurrent callers that find the cache stale are
/// serialized on a refresh gate, so they share a single grant call.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper used by the transport's retries
/// - `C`: The clock used for expiry bookkeeping (defaults to [`SystemClock`])
pub struct TokenManager<H, S = TokioSleeper, C = SystemClock> {
    transport: Arc<Transport<H, S>>,
    base_url: Url,
    client_id: String,
    client_secret: String,
    clock: C,
    refresh_margin_ms: u64,
    cache: Mutex<Option<CachedToken>>,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl<H, S, C> fmt::Debug for TokenManager<H, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.client_id)
            .field("refresh_margin_ms", &self.refresh_margin_ms)
            .field("cached", &self.expires_at_ms().is_some())
            .finish_non_exhaustive()
    }
}

impl<H, S> TokenManager<H, S, SystemClock> {
    /// Creates a manager with an empty cache.
    pub fn new(
        transport: Arc<Transport<H, S>>,
        base_url: Url,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            base_url,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            clock: SystemClock,
            refresh_margin_ms: defaults::TOKEN_REFRESH_MARGIN_MS,
            cache: Mutex::new(None),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }
}

impl<H, S, C> TokenManager<H, S, C> {
    /// Replaces the clock.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> TokenManager<H, S, C2> {
        TokenManager {
            transport: self.transport,
            base_url: self.base_url,
            client_id: self.client_id,
            client_secret: self.client_secret,
            clock,
            refresh_margin_ms: self.refresh_margin_ms,
            cache: self.cache,
            refresh_gate: self.refresh_gate,
        }
    }

    /// Sets how close to expiry a cached token is renewed.
    #[must_use]
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin_ms = u64::try_from(margin.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Drops the cached token so the next call performs a grant.
    pub fn invalidate(&self) {
        *self.lock_cache() = None;
        tracing::debug!(client_id = %self.client_id, "Access token invalidated");
    }

    /// Absolute expiry of the cached token in epoch milliseconds.
    #[must_use]
    pub fn expires_at_ms(&self) -> Option<u64> {
        self.lock_cache()
            .as_ref()
            .map(|cached| cached.expires_at_ms)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, Option<CachedToken>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<H: HttpClient, S: Sleeper, C: Clock> TokenManager<H, S, C> {
    /// Performs a client-credentials grant and caches the result.
    ///
    /// Always issues a request, even when a valid token is cached.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the grant call; the cache is left
    /// untouched in that case.
    pub async fn grant_token(&self) -> SdkResult<TokenResponse> {
        let url = endpoint_url(&self.base_url, TOKEN_GRANT_PATH, &QueryParams::new())?;
        let body = GrantRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            grant_type: GRANT_TYPE,
        };

        let response: TokenResponse = self
            .transport
            .post(url, &body, &RequestConfig::new())
            .await
            .inspect_err(|e| {
                tracing::warn!(client_id = %self.client_id, error = %e, "Token grant failed");
            })?;

        let expires_at_ms = self.clock.now_millis().saturating_add(response.expires_in);
        *self.lock_cache() = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at_ms,
        });

        tracing::info!(
            client_id = %self.client_id,
            expires_in = response.expires_in,
            "Access token granted"
        );
        Ok(response)
    }

    /// Returns the cached token, granting a new one when it is absent or
    /// within the refresh margin of expiry.
    ///
    /// # Errors
    ///
    /// Propagates the error of the grant call.
    pub async fn get_access_token(&self) -> SdkResult<String> {
        if let Some(token) = self.fresh_token() {
            return Ok(token);
        }

        let _gate = self.refresh_gate.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(token) = self.fresh_token() {
            return Ok(token);
        }

        Ok(self.grant_token().await?.access_token)
    }

    fn fresh_token(&self) -> Option<String> {
        let now = self.clock.now_millis();
        self.lock_cache()
            .as_ref()
            .filter(|cached| now < cached.expires_at_ms.saturating_sub(self.refresh_margin_ms))
            .map(|cached| cached.token.clone())
    }
}

//! Top-level client tying configuration, transport and tokens together.

use std::sync::Arc;

use url::Url;

use crate::SdkResult;
use crate::auth::TokenManager;
use crate::config::ClientConfig;
use crate::environment::{Environment, EnvironmentResolver};
use crate::resources::{Customers, Payments};
use crate::time::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::transport::{
    HttpClient, QueryParams, ReqwestClient, RequestConfig, Transport, endpoint_url,
};

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

/// Authenticated client for the merchant API.
///
/// Owns one [`Transport`] shared with its [`TokenManager`]; every resource
/// call obtains a bearer token first.
///
/// # Example
///
/// ```no_run
/// use merchant_sdk::{ClientConfig, Environment, MerchantClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::new(Environment::Sandbox, "client_id", "client_secret")?;
/// let client = MerchantClient::new(config);
///
/// let customer = client.customers().get("cus_123").await?;
/// println!("{}", customer.email);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MerchantClient<H = ReqwestClient, S = TokioSleeper, C = SystemClock> {
    config: ClientConfig,
    transport: Arc<Transport<H, S>>,
    tokens: TokenManager<H, S, C>,
}

impl MerchantClient {
    /// Creates a client using reqwest with default settings.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(config, ReqwestClient::new())
    }
}

impl<H> MerchantClient<H> {
    /// Creates a client on top of a custom HTTP client.
    #[must_use]
    pub fn with_http_client(config: ClientConfig, client: H) -> Self {
        let retry = config.retry_options();
        Self::from_transport(config, Transport::new(client, retry))
    }
}

impl<H, S> MerchantClient<H, S> {
    /// Creates a client from a fully configured transport.
    ///
    /// The transport's retry options are used as is.
    #[must_use]
    pub fn from_transport(config: ClientConfig, transport: Transport<H, S>) -> Self {
        let transport = Arc::new(transport);
        let tokens = TokenManager::new(
            Arc::clone(&transport),
            config.base_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        );

        tracing::debug!(%config, "Merchant client created");
        Self {
            config,
            transport,
            tokens,
        }
    }
}

impl<H, S, C> MerchantClient<H, S, C> {
    /// Replaces the clock used for token expiry.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> MerchantClient<H, S, C2> {
        MerchantClient {
            config: self.config,
            transport: self.transport,
            tokens: self.tokens.with_clock(clock),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the shared transport.
    #[must_use]
    pub fn transport(&self) -> &Transport<H, S> {
        &self.transport
    }

    /// Returns the token manager.
    #[must_use]
    pub const fn tokens(&self) -> &TokenManager<H, S, C> {
        &self.tokens
    }

    /// Customer operations.
    #[must_use]
    pub const fn customers(&self) -> Customers<'_, H, S, C> {
        Customers::new(self)
    }

    /// Payment operations.
    #[must_use]
    pub const fn payments(&self) -> Payments<'_, H, S, C> {
        Payments::new(self)
    }

    pub(crate) fn endpoint(&self, path: &str, params: &QueryParams) -> SdkResult<Url> {
        endpoint_url(&self.config.base_url, path, params)
    }
}

impl<H: HttpClient, S: Sleeper, C: Clock> MerchantClient<H, S, C> {
    /// Builds a per-call configuration carrying a valid bearer token.
    ///
    /// # Errors
    ///
    /// Propagates token grant failures.
    pub async fn authorized(&self) -> SdkResult<RequestConfig> {
        let token = self.tokens.get_access_token().await?;
        RequestConfig::new().with_bearer(&token)
    }
}

impl<H, S, C> EnvironmentResolver for MerchantClient<H, S, C> {
    fn environment(&self) -> Environment {
        self.config.environment
    }
}

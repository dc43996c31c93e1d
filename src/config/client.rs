//! Validated client configuration.
//!
//! All validation is performed during construction, so a [`ClientConfig`]
//! in hand is always usable.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::environment::{Environment, EnvironmentResolver};
use crate::retry::RetryOptions;

use super::error::{ConfigError, field};
use super::file::FileConfig;

/// Partial retry configuration supplied by the caller.
///
/// Unset fields keep the [`RetryOptions`] defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryOverrides {
    /// Retries after the first attempt
    pub max_number_of_retries: Option<i32>,
    /// Base delay
    pub delay: Option<Duration>,
    /// Backoff multiplier
    pub backoff_factor: Option<f64>,
    /// Cap on backoff waits
    pub max_delay: Option<Duration>,
    /// Retryable HTTP status codes
    pub retry_on_status: Option<Vec<u16>>,
}

impl RetryOverrides {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(factor) = self.backoff_factor {
            if factor.is_nan() || factor <= 0.0 {
                return Err(ConfigError::InvalidRetry(format!(
                    "backoff_factor must be positive, got {factor}"
                )));
            }
        }
        if self.max_delay == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidRetry(
                "max_delay must be greater than zero".to_string(),
            ));
        }
        if let Some(statuses) = &self.retry_on_status {
            if let Some(bad) = statuses.iter().find(|s| !(100..=599).contains(*s)) {
                return Err(ConfigError::InvalidRetry(format!(
                    "retry_on_status contains invalid HTTP status {bad}"
                )));
            }
        }
        Ok(())
    }
}

impl RetryOptions {
    /// Returns these options with every set override applied.
    #[must_use]
    pub fn merged(mut self, overrides: &RetryOverrides) -> Self {
        if let Some(retries) = overrides.max_number_of_retries {
            self.max_number_of_retries = retries;
        }
        if let Some(delay) = overrides.delay {
            self.delay = delay;
        }
        if let Some(factor) = overrides.backoff_factor {
            self.backoff_factor = factor;
        }
        if let Some(max_delay) = overrides.max_delay {
            self.max_delay = max_delay;
        }
        if let Some(statuses) = &overrides.retry_on_status {
            self.retry_on_status = statuses.iter().copied().collect();
        }
        self
    }
}

/// Fully validated client configuration.
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    /// Target environment
    pub environment: Environment,

    /// Resolved API base URL
    pub base_url: Url,

    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Caller retry overrides
    pub retry: RetryOverrides,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("retry", &self.retry)
            .finish()
    }
}

impl fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClientConfig {{ environment: {}, base_url: {}, client_id: {} }}",
            self.environment, self.base_url, self.client_id
        )
    }
}

impl EnvironmentResolver for ClientConfig {
    fn environment(&self) -> Environment {
        self.environment
    }
}

impl ClientConfig {
    /// Creates a configuration using the environment's default base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the client id or secret is empty.
    pub fn new(
        environment: Environment,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let client_id = require(
            client_id.into(),
            field::CLIENT_ID,
            "Pass a non-empty client id",
        )?;
        let client_secret = require(
            client_secret.into(),
            field::CLIENT_SECRET,
            "Pass a non-empty client secret",
        )?;

        Ok(Self {
            environment,
            base_url: parse_base_url(environment.default_base_url())?,
            client_id,
            client_secret,
            retry: RetryOverrides::default(),
        })
    }

    /// Overrides the base URL (e.g. a local mock server).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Sets the retry overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is out of range.
    pub fn with_retry(mut self, retry: RetryOverrides) -> Result<Self, ConfigError> {
        retry.validate()?;
        self.retry = retry;
        Ok(self)
    }

    /// Resolves the retry options for this client: defaults merged with
    /// the caller overrides.
    #[must_use]
    pub fn retry_options(&self) -> RetryOptions {
        RetryOptions::default().merged(&self.retry)
    }

    /// Builds a validated configuration from a parsed file.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or any value is invalid.
    pub fn from_file(file: &FileConfig) -> Result<Self, ConfigError> {
        let environment = file
            .client
            .environment
            .as_deref()
            .map_or(Ok(Environment::default()), str::parse)?;

        let client_id = file.client.client_id.clone().ok_or_else(|| {
            ConfigError::missing(field::CLIENT_ID, "Set client.client_id in config file")
        })?;
        let client_secret = file.client.client_secret.clone().ok_or_else(|| {
            ConfigError::missing(
                field::CLIENT_SECRET,
                "Set client.client_secret in config file",
            )
        })?;

        let mut config = Self::new(environment, client_id, client_secret)?;
        if let Some(base_url) = &file.client.base_url {
            config = config.with_base_url(base_url)?;
        }

        let retry = &file.retry;
        config.with_retry(RetryOverrides {
            max_number_of_retries: retry.max_number_of_retries,
            delay: retry.delay_ms.map(Duration::from_millis),
            backoff_factor: retry.backoff_factor,
            max_delay: retry.max_delay_ms.map(Duration::from_millis),
            retry_on_status: retry.retry_on_status.clone(),
        })
    }

    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the
    /// configuration is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_file(&FileConfig::load(path)?)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or the configuration is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::from_file(&FileConfig::parse(content)?)
    }
}

fn require(value: String, name: &'static str, hint: &'static str) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::missing(name, hint));
    }
    Ok(value)
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}

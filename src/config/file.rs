//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional so that validation can report precisely
/// which required value is missing.
///
/// # Example
///
/// ```
/// use merchant_sdk::config::FileConfig;
///
/// let config = FileConfig::parse(
///     r#"
///     [client]
///     environment = "sandbox"
///     client_id = "your-client-id"
///     client_secret = "your-client-secret"
///
///     [retry]
///     max_number_of_retries = 3
///     delay_ms = 1000
///     backoff_factor = 2.0
///     max_delay_ms = 30000
///     retry_on_status = [408, 429, 500, 502, 503, 504]
///     "#,
/// )?;
/// assert_eq!(config.client.environment.as_deref(), Some("sandbox"));
/// # Ok::<(), merchant_sdk::config::ConfigError>(())
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Client credentials and endpoint section
    #[serde(default)]
    pub client: ClientSection,

    /// Retry overrides section
    #[serde(default)]
    pub retry: RetrySection,
}

/// Client configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    /// Environment name: "sandbox" or "production"
    pub environment: Option<String>,

    /// Explicit base URL overriding the environment default
    pub base_url: Option<String>,

    /// OAuth client id
    pub client_id: Option<String>,

    /// OAuth client secret
    pub client_secret: Option<String>,
}

/// Retry overrides section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Retries after the first attempt
    pub max_number_of_retries: Option<i32>,

    /// Base delay in milliseconds
    pub delay_ms: Option<u64>,

    /// Backoff multiplier
    pub backoff_factor: Option<f64>,

    /// Maximum backoff delay in milliseconds
    pub max_delay_ms: Option<u64>,

    /// Retryable HTTP status codes
    pub retry_on_status: Option<Vec<u16>>,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

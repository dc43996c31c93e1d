//! Deployment environments and the sandbox-only guard.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::Deserialize;

use crate::config::{ConfigError, defaults};
use crate::{EnvironmentError, SdkError, SdkResult};

/// Target environment of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Test environment; sandbox-only operations are allowed.
    #[default]
    Sandbox,
    /// Live environment.
    Production,
}

impl Environment {
    /// Returns the default API base URL for this environment.
    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Sandbox => defaults::SANDBOX_BASE_URL,
            Self::Production => defaults::PRODUCTION_BASE_URL,
        }
    }

    /// Returns true for the production environment.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sandbox => write!(f, "sandbox"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "test" => Ok(Self::Sandbox),
            "production" | "prod" | "live" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidEnvironment {
                value: s.to_string(),
            }),
        }
    }
}

/// Capability of resolving the environment an object operates in.
pub trait EnvironmentResolver {
    /// Returns the current environment.
    fn environment(&self) -> Environment;
}

impl EnvironmentResolver for Environment {
    fn environment(&self) -> Environment {
        *self
    }
}

/// Refuses `operation` when `resolver` reports production.
///
/// # Errors
///
/// Returns [`EnvironmentError::ProductionRestricted`] in production.
pub fn ensure_sandbox(
    resolver: &impl EnvironmentResolver,
    operation: &'static str,
) -> Result<(), EnvironmentError> {
    if resolver.environment().is_production() {
        tracing::warn!(operation, "Refusing sandbox-only operation in production");
        return Err(EnvironmentError::ProductionRestricted { operation });
    }
    Ok(())
}

/// Runs `op` only outside production.
///
/// The environment is checked before `op` is called, so a refused
/// operation issues no network traffic.
///
/// # Errors
///
/// Returns [`SdkError::Environment`] in production, otherwise whatever
/// `op` returns.
pub async fn sandbox_only<R, F, Fut, T>(
    resolver: &R,
    operation: &'static str,
    op: F,
) -> SdkResult<T>
where
    R: EnvironmentResolver,
    F: FnOnce() -> Fut,
    Fut: Future<Output = SdkResult<T>>,
{
    ensure_sandbox(resolver, operation).map_err(SdkError::from)?;
    op().await
}

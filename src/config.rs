//! Gateway configuration
//!
//! One TOML file describes every environment; the active one is picked at
//! startup by name.
//!
//! ```toml
//! [environments.dev]
//! graphql_url = "http://localhost:7071/api"
//! rest_url = "http://localhost:7071/api"
//! transport = "graphql"
//! timeout_ms = 10000
//! binding = "variables"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::document::BindingStyle;
use crate::{GatewayError, Result};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Which remote protocol backs the services
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    GraphQL,
    Rest,
}

/// Remote client settings for one environment
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClientSettings {
    /// Base URL of the GraphQL functions
    pub graphql_url: Url,
    /// Base URL of the REST functions
    pub rest_url: Url,
    #[serde(default)]
    pub transport: TransportKind,
    /// Per-call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub binding: BindingStyle,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Top-level configuration file
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address the inbound server listens on
    #[serde(default)]
    pub listen_address: Option<SocketAddr>,
    pub environments: BTreeMap<String, ClientSettings>,
}

impl GatewayConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| GatewayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Settings of the named environment
    pub fn select(&self, environment: &str) -> Result<&ClientSettings> {
        self.environments.get(environment).ok_or_else(|| {
            let known: Vec<&str> = self.environments.keys().map(String::as_str).collect();
            GatewayError::Config(format!(
                "Unknown environment '{}' (configured: {})",
                environment,
                known.join(", ")
            ))
        })
    }

    fn validate(&self) -> Result<()> {
        if self.environments.is_empty() {
            return Err(GatewayError::Config(
                "At least one environment must be configured".to_string(),
            ));
        }
        for (name, settings) in &self.environments {
            if settings.timeout_ms == 0 {
                return Err(GatewayError::Config(format!(
                    "Environment '{}': timeout_ms must be positive",
                    name
                )));
            }
        }
        Ok(())
    }
}

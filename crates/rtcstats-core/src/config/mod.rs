//! Configuration for the trace client, loadable from TOML.
//!
//! # Examples
//!
//! ```
//! use rtcstats_core::config::TraceConfig;
//!
//! let config = TraceConfig::from_toml("[transport]\nuse_legacy = true").unwrap();
//! assert_eq!(config.transport.protocol_version(), "3.1_LEGACY");
//! assert_eq!(config.transport.buffer_limit, 1000);
//! ```

pub mod defaults;
pub mod observability_config;
pub mod transport_config;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub use observability_config::ObservabilityConfig;
pub use transport_config::TransportConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub transport: TransportConfig,
    pub observability: ObservabilityConfig,
}

impl TraceConfig {
    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&raw).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.transport;
        if !(t.endpoint.starts_with("ws://") || t.endpoint.starts_with("wss://")) {
            return Err(ConfigError::ValidationFailed {
                field: "transport.endpoint".to_string(),
                message: format!("expected a ws:// or wss:// url, got {:?}", t.endpoint),
            });
        }
        if t.buffer_limit == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "transport.buffer_limit".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if t.ping_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "transport.ping_interval_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if t.close_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "transport.close_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if t.backoff_base_ms == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "transport.backoff_base_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

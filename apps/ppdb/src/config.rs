//! # Configuration Module
//!
//! Server configuration loaded from an optional TOML file and overridden by
//! environment variables.
//!
//! ## File format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [security]
//! api_key = "secret"
//! rate_limit = 100
//! cors_origins = "http://localhost:3000"
//!
//! [jobs]
//! export_tick_millis = 300
//! announcement_sweep_secs = 30
//! ```
//!
//! Every field has a default, so an empty file (or no file) is valid.
//!
//! ## Environment overrides
//!
//! - `PPDB_API_KEY`: API key guarding `/admin/*` (empty disables auth)
//! - `PPDB_RATE_LIMIT`: requests per second (0 disables limiting)
//! - `PPDB_CORS_ORIGINS`: comma-separated origins, or `*`

use ppdb_core::{PpdbError, primitives::EXPORT_TICK_MILLIS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest config file accepted.
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Fastest export tick the server will run.
pub const MIN_EXPORT_TICK_MILLIS: u64 = 10;

pub const ENV_API_KEY: &str = "PPDB_API_KEY";
pub const ENV_RATE_LIMIT: &str = "PPDB_RATE_LIMIT";
pub const ENV_CORS_ORIGINS: &str = "PPDB_CORS_ORIGINS";

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Bearer key for `/admin/*`; `None` leaves the back office open.
    pub api_key: Option<String>,
    /// Requests per second across all clients; 0 disables limiting.
    pub rate_limit: u32,
    /// `None` means localhost only.
    pub cors_origins: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            rate_limit: 100,
            cors_origins: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    pub export_tick_millis: u64,
    /// How often scheduled announcements are checked for publication.
    pub announcement_sweep_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            export_tick_millis: EXPORT_TICK_MILLIS,
            announcement_sweep_secs: 30,
        }
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub jobs: JobsConfig,
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, PpdbError> {
        toml::from_str(text).map_err(|e| PpdbError::ConfigError(format!("Invalid TOML: {}", e)))
    }

    /// Read `path` (when given), apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, PpdbError> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, PpdbError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            PpdbError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(PpdbError::ConfigError(format!(
                "Config file size {} bytes exceeds maximum {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            PpdbError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Override fields from `PPDB_*` environment variables.
    ///
    /// An unparsable `PPDB_RATE_LIMIT` is ignored with a warning.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            self.security.api_key = Some(key);
        }
        if let Ok(value) = std::env::var(ENV_RATE_LIMIT) {
            match value.trim().parse() {
                Ok(limit) => self.security.rate_limit = limit,
                Err(_) => tracing::warn!(
                    variable = ENV_RATE_LIMIT,
                    value = %value,
                    "Ignoring invalid rate limit"
                ),
            }
        }
        if let Ok(origins) = std::env::var(ENV_CORS_ORIGINS) {
            self.security.cors_origins = Some(origins);
        }
        self.security.api_key = self.security.api_key.take().filter(|k| !k.is_empty());
    }

    pub fn validate(&self) -> Result<(), PpdbError> {
        if self.server.host.trim().is_empty() {
            return Err(PpdbError::ConfigError("server.host must not be empty".into()));
        }
        if self.server.port == 0 {
            return Err(PpdbError::ConfigError("server.port must not be 0".into()));
        }
        if self.jobs.export_tick_millis < MIN_EXPORT_TICK_MILLIS {
            return Err(PpdbError::ConfigError(format!(
                "jobs.export_tick_millis must be at least {}",
                MIN_EXPORT_TICK_MILLIS
            )));
        }
        if self.jobs.announcement_sweep_secs == 0 {
            return Err(PpdbError::ConfigError(
                "jobs.announcement_sweep_secs must not be 0".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_toml_str("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.jobs.export_tick_millis, 300);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml_str("[server]\nport = 9000\n").expect("parse");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.security.rate_limit, 100);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.jobs.export_tick_millis = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_config_error() {
        assert!(matches!(
            AppConfig::from_toml_str("[server\nport = "),
            Err(PpdbError::ConfigError(_))
        ));
    }
}

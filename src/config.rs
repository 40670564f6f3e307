//! Configuration module
//!
//! Reads configuration from a TOML file
//! (`~/.config/user-registry/config.toml` by default).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::infrastructure::consent::ConsentSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub consent: ConsentSettings,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database URL (e.g., "sqlite://./users.db?mode=rwc")
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://./users.db?mode=rwc".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter (overridden by `RUST_LOG`)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Default config file location
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("user-registry")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.address(), "0.0.0.0:8080");
        assert!(cfg.database.url.starts_with("sqlite://"));
        assert!(!cfg.consent.is_configured());
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn parses_partial_toml() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9090

            [consent]
            uri = "https://consent.example.com/v1/"
            service_key = "key"
            secret_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(cfg.consent.is_configured());
        assert_eq!(cfg.consent.service_key, "key");
    }
}

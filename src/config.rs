//! # Bridge Configuration
//!
//! The bridge reads one TOML file describing the HTTP listener and the
//! printers it fronts.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [[printers]]
//! id = "workshop"
//! host = "192.168.1.50"
//!
//! [[printers]]
//! host = "192.168.1.51"
//! port = 8899
//! timeout_ms = 5000
//! ```
//!
//! - `id` defaults to `host`.
//! - `port` defaults to 8899 and `timeout_ms` to 3000.
//! - The `FLASHFORGE_PORT` environment variable overrides `server.port`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::DEFAULT_PORT;

/// Environment variable overriding the HTTP listen port.
pub const PORT_ENV: &str = "FLASHFORGE_PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub printers: Vec<PrinterConfig>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// One printer reachable over the status protocol.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PrinterConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub host: String,
    #[serde(default = "default_printer_port")]
    pub port: u16,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl PrinterConfig {
    /// The printer's identity: its configured id, else its host.
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.host)
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for printer in &self.printers {
            if printer.host.trim().is_empty() {
                return Err(ConfigError::Invalid("printer host cannot be empty".to_string()));
            }
            if printer.timeout_ms == 0 {
                return Err(ConfigError::Invalid(format!(
                    "printer {}: timeout_ms must be greater than 0",
                    printer.id()
                )));
            }
            if !seen.insert(printer.id()) {
                return Err(ConfigError::Invalid(format!("duplicate printer id: {}", printer.id())));
            }
        }
        Ok(())
    }

    pub fn printer(&self, id: &str) -> Option<&PrinterConfig> {
        self.printers.iter().find(|p| p.id() == id)
    }

    /// Applies a `FLASHFORGE_PORT`-style override to the listen port.
    pub fn apply_port_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        if let Some(value) = value {
            self.server.port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{PORT_ENV} is not a port: {value:?}")))?;
        }
        Ok(())
    }
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}
fn default_server_port() -> u16 {
    8080
}
fn default_printer_port() -> u16 {
    DEFAULT_PORT
}
fn default_timeout_ms() -> u64 {
    3_000
}

pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents).inspect_err(|e| {
            tracing::error!("Failed to load config '{}': {}", path, e);
        }),
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            Err(ConfigError::Io(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = parse_config(
            r#"
            [[printers]]
            host = "192.168.1.50"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        let printer = &config.printers[0];
        assert_eq!(printer.id(), "192.168.1.50");
        assert_eq!(printer.port, 8899);
        assert_eq!(printer.timeout_ms, 3000);
    }

    #[test]
    fn test_lookup_by_id() {
        let config = parse_config(
            r#"
            [[printers]]
            id = "workshop"
            host = "10.0.0.2"

            [[printers]]
            host = "10.0.0.3"
            "#,
        )
        .unwrap();
        assert_eq!(config.printer("workshop").unwrap().host, "10.0.0.2");
        assert_eq!(config.printer("10.0.0.3").unwrap().host, "10.0.0.3");
        assert!(config.printer("10.0.0.2").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = parse_config(
            r#"
            [[printers]]
            host = "10.0.0.2"

            [[printers]]
            id = "10.0.0.2"
            host = "10.0.0.9"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            parse_config("[[printers]]\nhost = \" \""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse_config("[[printers]]\nhost = \"a\"\ntimeout_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(parse_config("[[printers]]\nport = 1"), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_port_override() {
        let mut config = Config::default();
        config.apply_port_override(None).unwrap();
        assert_eq!(config.server.port, 8080);
        config.apply_port_override(Some("9090")).unwrap();
        assert_eq!(config.server.port, 9090);
        assert!(config.apply_port_override(Some("http")).is_err());
    }
}

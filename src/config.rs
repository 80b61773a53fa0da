use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::Path;

use crate::error::VerificationError;
use crate::protocol::{DEFAULT_PROTOCOL_NAME, VERIFY_PATH};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    /// Name embedded in the challenge message.
    pub protocol_name: String,
    /// Where the client flow submits signed challenges.
    pub verify_endpoint: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            protocol_name: DEFAULT_PROTOCOL_NAME.to_string(),
            verify_endpoint: format!("http://127.0.0.1:3000{}", VERIFY_PATH),
        }
    }
}

impl AppConfig {
    /// Load from environment variables, falling back to defaults.
    pub fn load() -> Result<Self, VerificationError> {
        let defaults = Self::default();

        let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);

        let server_port = match env::var("SERVER_PORT") {
            Ok(port) => port.parse().map_err(|e| {
                VerificationError::ConfigError(format!("Invalid SERVER_PORT {:?}: {}", port, e))
            })?,
            Err(_) => defaults.server_port,
        };

        let protocol_name = env::var("PROTOCOL_NAME").unwrap_or(defaults.protocol_name);

        let verify_endpoint = env::var("VERIFY_ENDPOINT").unwrap_or(defaults.verify_endpoint);

        let config = AppConfig {
            server_host,
            server_port,
            protocol_name,
            verify_endpoint,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file; absent keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, VerificationError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VerificationError::ConfigError(format!("Failed to read {:?}: {}", path, e))
        })?;

        let config: AppConfig = toml::from_str(&contents).map_err(|e| {
            VerificationError::ConfigError(format!("Failed to parse {:?}: {}", path, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), VerificationError> {
        if self.protocol_name.trim().is_empty() {
            return Err(VerificationError::ConfigError(
                "protocol_name must not be empty".to_string(),
            ));
        }
        if self.verify_endpoint.trim().is_empty() {
            return Err(VerificationError::ConfigError(
                "verify_endpoint must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, VerificationError> {
        format!("{}:{}", self.server_host, self.server_port)
            .parse()
            .map_err(|e| {
                VerificationError::ConfigError(format!(
                    "Invalid listen address {}:{}: {}",
                    self.server_host, self.server_port, e
                ))
            })
    }
}

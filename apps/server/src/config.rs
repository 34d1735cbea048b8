//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults suitable for a single-location deployment.

use std::env;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port.
    pub port: u16,

    /// Path to the SQLite database file.
    pub database_path: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "cantina.db".to_string()),
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Not set in the test environment.
        let config = ServerConfig::load().unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_path, "cantina.db");
    }
}

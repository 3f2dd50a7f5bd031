use anyhow::Result;
use std::fs;

use super::types::*;
use crate::cli::StartArgs;
use crate::errors::SecureHeadersError;

impl Config {
    /// Load configuration from CLI arguments and optional config file
    pub fn load(cli: &StartArgs) -> Result<Self> {
        let mut config = match &cli.config {
            Some(config_path) => Self::load_from_file(config_path)?,
            None => Self::default(),
        };

        Self::apply_cli_overrides(&mut config, cli);
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(config_path: &str) -> Result<Self, SecureHeadersError> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            SecureHeadersError::Config(format!("Failed to read config file {config_path}: {e}"))
        })?;

        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self, SecureHeadersError> {
        Ok(toml::from_str(content)?)
    }

    /// Explicit CLI args take precedence over the config file
    fn apply_cli_overrides(config: &mut Self, cli: &StartArgs) {
        if let Some(address) = &cli.address {
            config.server.address = address.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if cli.assume_secure {
            config.server.assume_secure = true;
        }
        if let Some(level) = &cli.log_level {
            config.logging.level = level.clone();
        }
    }
}

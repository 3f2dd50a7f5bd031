use std::net::IpAddr;

use tracing::{error, warn};

use super::types::Config;
use crate::configuration::Configuration;
use crate::engine::SecureHeaders;
use crate::errors::SecureHeadersError;

impl Config {
    /// Validate the configuration settings
    pub fn validate(&self) -> Result<(), SecureHeadersError> {
        self.validate_server()?;

        // Header tables go through the same validators as the builder API
        self.build_configurations()?;

        self.validate_security();

        Ok(())
    }

    /// Validate server configuration
    fn validate_server(&self) -> Result<(), SecureHeadersError> {
        if self.server.port == 0 {
            return Err(SecureHeadersError::Config(
                "Invalid port number: must be between 1 and 65535".to_string(),
            ));
        }

        self.server.address.parse::<IpAddr>().map_err(|e| {
            SecureHeadersError::Config(format!(
                "Invalid bind address '{}': {e}",
                self.server.address
            ))
        })?;

        Ok(())
    }

    /// Log warnings for settings that silently weaken the emitted headers
    fn validate_security(&self) {
        if !self.server.assume_secure && !self.server.trust_forwarded_proto {
            warn!("⚠️  SECURITY WARNING: no way to detect HTTPS requests is configured");
            warn!("⚠️  Strict-Transport-Security and Public-Key-Pins will never be sent");
            warn!("⚠️  Set 'assume_secure' or 'trust_forwarded_proto' behind a TLS proxy");
        }

        if self.headers.default.is_empty() {
            warn!("⚠️  No [headers.default] table configured - using built-in defaults");
        }
    }

    /// Build the default configuration and every named profile. Named
    /// profiles start from the default and replace the keys they set.
    pub fn build_configurations(
        &self,
    ) -> Result<(Configuration, Vec<(String, Configuration)>), SecureHeadersError> {
        let default = Configuration::from_table(&self.headers.default)?;

        let mut named = Vec::with_capacity(self.headers.named.len());
        for (name, table) in &self.headers.named {
            let mut builder = default.to_builder();
            for (key, value) in table {
                builder.set_raw(key.parse()?, value.clone());
            }
            let config = builder.build().map_err(|e| {
                error!("Named configuration '{}' is invalid: {}", name, e);
                e
            })?;
            named.push((name.clone(), config));
        }

        Ok((default, named))
    }

    /// Install every configuration into `engine`. Nothing is installed
    /// unless all of them are valid.
    pub fn apply(&self, engine: &SecureHeaders) -> Result<(), SecureHeadersError> {
        let (default, named) = self.build_configurations()?;
        engine.store().replace_all(default, named);
        Ok(())
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub headers: HeadersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Treat every request as secure, e.g. when TLS is terminated in front
    /// of this process on the same host.
    pub assume_secure: bool,
    /// Trust `X-Forwarded-Proto: https` from a reverse proxy.
    pub trust_forwarded_proto: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 3000,
            assume_secure: false,
            trust_forwarded_proto: false,
        }
    }
}

/// Header tables keyed by configuration key (`hsts`, `csp`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadersConfig {
    pub default: Map<String, Value>,
    /// Named profiles, each applied on top of `default`.
    pub named: BTreeMap<String, Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

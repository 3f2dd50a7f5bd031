use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::settings::Config;
use crate::engine::SecureHeaders;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SecureHeaders>,
    pub config: Config,
    pub metrics: Arc<Metrics>,
}

/// Basic metrics for monitoring
#[derive(Default)]
pub struct Metrics {
    pub responses: AtomicU64,
    pub resolution_errors: AtomicU64,
    pub nonces_issued: AtomicU64,
}

impl AppState {
    /// Install the configured headers into `engine` and wrap it for sharing.
    pub fn new(config: Config, engine: Arc<SecureHeaders>) -> Result<Self, crate::errors::SecureHeadersError> {
        config.apply(&engine)?;

        Ok(Self {
            engine,
            config,
            metrics: Arc::new(Metrics::default()),
        })
    }
}

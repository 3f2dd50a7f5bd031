use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::settings::Config;
use crate::engine::SecureHeaders;
use crate::errors::SecureHeadersError;
use crate::handlers::{embed, get_metrics, health_check, index, profile_status};
use crate::middleware::secure_headers_middleware;

pub mod state;
pub use state::AppState;

#[cfg(test)]
mod tests;

/// HTTP server that applies the configured security headers to every response
pub struct Server {
    config: Config,
    app_state: AppState,
}

impl Server {
    pub fn new(config: Config, engine: Arc<SecureHeaders>) -> Result<Self, SecureHeadersError> {
        let app_state = AppState::new(config.clone(), engine)?;
        Ok(Self { config, app_state })
    }

    pub async fn serve(self) -> Result<(), SecureHeadersError> {
        let app = self.create_router();

        let addr = SocketAddr::new(
            self.config
                .server
                .address
                .parse()
                .map_err(|e| SecureHeadersError::Config(format!("Invalid bind address: {e}")))?,
            self.config.server.port,
        );

        info!("🚀 Secure headers server starting on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| SecureHeadersError::Config(format!("Failed to bind to {addr}: {e}")))?;

        info!("✅ Server ready - accepting connections on {}", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| SecureHeadersError::Config(format!("Server error: {e}")))?;

        Ok(())
    }

    pub fn create_router(&self) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/embed", get(embed))
            .route("/profiles/{name}", get(profile_status))
            .route("/health", get(health_check))
            .route("/metrics", get(get_metrics))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(middleware::from_fn_with_state(
                        self.app_state.clone(),
                        secure_headers_middleware,
                    )),
            )
            .with_state(self.app_state.clone())
    }
}

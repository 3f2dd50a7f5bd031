//! Security response headers from layered configuration.
//!
//! A process-wide default [`Configuration`] (plus optional named ones) is
//! installed once through [`SecureHeaders`]. Each request gets a
//! [`RequestContext`] on which handlers can opt out of, override or append
//! to headers and request a CSP nonce; [`SecureHeaders::resolve_headers`]
//! then renders the final header set.

pub mod capability;
pub mod cli;
pub mod configuration;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod headers;
pub mod middleware;
pub mod nonce;
pub mod request;
pub mod resolver;
pub mod serializer;
pub mod server;
pub mod settings;
pub mod store;
pub mod utils;

pub use capability::CapabilityTier;
pub use configuration::{Configuration, ConfigurationBuilder};
pub use engine::SecureHeaders;
pub use errors::{CspConfigError, SecureHeadersError};
pub use headers::{HeaderConfig, HeaderKind, HeaderSetting};
pub use request::RequestContext;
pub use resolver::ResolvedHeaderSet;
pub use server::Server;
pub use settings::Config;

// Re-export CLI types for main.rs
pub use cli::*;

// Integration tests
#[cfg(test)]
pub mod integration_test;

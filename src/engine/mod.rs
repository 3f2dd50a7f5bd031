//! The public entry point: configure once, then resolve headers per request.

use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tracing::debug;

use crate::configuration::{self, Configuration, ConfigurationBuilder};
use crate::errors::SecureHeadersError;
use crate::headers::{DirectiveTable, HeaderConfig, HeaderKind, HeaderSetting};
use crate::nonce::{NonceGenerator, OsRngNonceGenerator};
use crate::request::{OverrideOp, RequestContext};
use crate::resolver::{self, ResolvedHeaderSet};
use crate::store::ConfigurationStore;

#[cfg(test)]
mod tests;

pub struct SecureHeaders {
    store: ConfigurationStore,
    nonce_generator: Arc<dyn NonceGenerator>,
}

impl Default for SecureHeaders {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SecureHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureHeaders")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl SecureHeaders {
    pub fn new() -> Self {
        Self::with_nonce_generator(Arc::new(OsRngNonceGenerator))
    }

    pub fn with_nonce_generator(nonce_generator: Arc<dyn NonceGenerator>) -> Self {
        Self {
            store: ConfigurationStore::new(),
            nonce_generator,
        }
    }

    /// Process-wide instance for applications that configure once at startup.
    pub fn global() -> &'static SecureHeaders {
        static GLOBAL: OnceLock<SecureHeaders> = OnceLock::new();
        GLOBAL.get_or_init(SecureHeaders::new)
    }

    pub fn store(&self) -> &ConfigurationStore {
        &self.store
    }

    /// Build and install the default configuration. On error the previous
    /// default (if any) stays in place.
    pub fn configure_default<F>(&self, configure: F) -> Result<(), SecureHeadersError>
    where
        F: FnOnce(&mut ConfigurationBuilder),
    {
        let mut builder = Configuration::builder();
        configure(&mut builder);
        let config = builder.build()?;
        self.store.set_default(config);
        Ok(())
    }

    /// Build and install a named configuration from scratch.
    pub fn configure_named<F>(
        &self,
        name: impl Into<String>,
        configure: F,
    ) -> Result<(), SecureHeadersError>
    where
        F: FnOnce(&mut ConfigurationBuilder),
    {
        let mut builder = Configuration::builder();
        configure(&mut builder);
        let config = builder.build()?;
        self.store.set_named(name, config);
        Ok(())
    }

    /// Build a named configuration starting from the current default.
    pub fn configure_named_from_default<F>(
        &self,
        name: impl Into<String>,
        configure: F,
    ) -> Result<(), SecureHeadersError>
    where
        F: FnOnce(&mut ConfigurationBuilder),
    {
        let mut builder = self.store.default_config()?.to_builder();
        configure(&mut builder);
        let config = builder.build()?;
        self.store.set_named(name, config);
        Ok(())
    }

    /// Use the named configuration as this request's base.
    pub fn use_named(
        &self,
        context: &mut RequestContext,
        name: &str,
    ) -> Result<(), SecureHeadersError> {
        self.store.get(Some(name))?;
        context.set_config_name(name);
        Ok(())
    }

    pub fn opt_out_of_header(
        &self,
        context: &mut RequestContext,
        kind: HeaderKind,
    ) -> Result<(), SecureHeadersError> {
        self.ensure_configured(context)?;
        context.record(kind, OverrideOp::OptOut);
        Ok(())
    }

    pub fn opt_out_of_all(&self, context: &mut RequestContext) -> Result<(), SecureHeadersError> {
        self.ensure_configured(context)?;
        for kind in HeaderKind::ALL {
            context.record(kind, OverrideOp::OptOut);
        }
        Ok(())
    }

    /// Replace a header's value for this request.
    pub fn override_header(
        &self,
        context: &mut RequestContext,
        value: impl Into<HeaderConfig>,
    ) -> Result<(), SecureHeadersError> {
        self.ensure_configured(context)?;
        let value = value.into();
        value.validate()?;
        context.record(value.kind(), OverrideOp::Override(value));
        Ok(())
    }

    /// Like [`Self::override_header`], from a loosely typed value. `false`
    /// records an opt-out and `true`/`null` restore the built-in default.
    pub fn override_header_raw(
        &self,
        context: &mut RequestContext,
        kind: HeaderKind,
        value: &Value,
    ) -> Result<(), SecureHeadersError> {
        self.ensure_configured(context)?;
        let op = match configuration::validate(kind, value)? {
            HeaderSetting::OptOut => OverrideOp::OptOut,
            HeaderSetting::Value(value) => OverrideOp::Override(value),
            HeaderSetting::Unset => match HeaderConfig::default_for(kind) {
                Some(value) => OverrideOp::Override(value),
                None => OverrideOp::OptOut,
            },
        };
        context.record(kind, op);
        Ok(())
    }

    /// Add directive tokens for this request, e.g.
    /// `json!({ "script_src": ["cdn.example.com"] })`. Only CSP supports
    /// appending.
    pub fn append_header(
        &self,
        context: &mut RequestContext,
        kind: HeaderKind,
        partial: &Value,
    ) -> Result<(), SecureHeadersError> {
        self.ensure_configured(context)?;
        if kind != HeaderKind::Csp {
            return Err(SecureHeadersError::AppendUnsupported(kind));
        }
        let additions = configuration::parse_csp_additions(partial)?;
        context.record(kind, OverrideOp::Append(additions));
        Ok(())
    }

    pub fn append_csp_directives(
        &self,
        context: &mut RequestContext,
        additions: DirectiveTable,
    ) -> Result<(), SecureHeadersError> {
        self.ensure_configured(context)?;
        context.record(HeaderKind::Csp, OverrideOp::Append(additions));
        Ok(())
    }

    /// The request's nonce, generated on first use. Also marks the request
    /// so the nonce is added to `script-src`/`style-src` for capable clients.
    pub fn nonce_for_script(&self, context: &RequestContext) -> String {
        context
            .nonce_or_generate(self.nonce_generator.as_ref())
            .to_string()
    }

    /// Same nonce as [`Self::nonce_for_script`]; one nonce per request.
    pub fn nonce_for_style(&self, context: &RequestContext) -> String {
        self.nonce_for_script(context)
    }

    /// Every header that applies to this request.
    pub fn resolve_headers(
        &self,
        context: &RequestContext,
    ) -> Result<ResolvedHeaderSet, SecureHeadersError> {
        let base = self.store.get(context.config_name())?;
        let headers = resolver::resolve_request(&base, context);
        debug!(
            "Resolved {} security header(s) (secure={}, tier={:?})",
            headers.len(),
            context.is_secure(),
            context.tier()
        );
        Ok(headers)
    }

    fn ensure_configured(&self, context: &RequestContext) -> Result<(), SecureHeadersError> {
        self.store.get(context.config_name()).map(|_| ())
    }
}

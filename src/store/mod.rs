//! Process-wide registry of the default and named configurations.
//!
//! Readers load the current registry snapshot without locking. Writers are
//! serialized, copy the snapshot, change it and publish the copy.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::info;

use crate::configuration::Configuration;
use crate::errors::SecureHeadersError;


#[derive(Debug, Clone, Default)]
struct Registry {
    default: Option<Arc<Configuration>>,
    named: HashMap<String, Arc<Configuration>>,
}

#[derive(Debug, Default)]
pub struct ConfigurationStore {
    registry: ArcSwap<Registry>,
    writer: Mutex<()>,
}

impl ConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, change: impl FnOnce(&mut Registry)) {
        let _writer = self.writer.lock();
        let mut next = Registry::clone(&self.registry.load());
        change(&mut next);
        self.registry.store(Arc::new(next));
    }

    /// Replace the default configuration.
    pub fn set_default(&self, config: Configuration) -> Arc<Configuration> {
        let config = Arc::new(config);
        self.update(|registry| registry.default = Some(Arc::clone(&config)));
        info!("🔒 Default secure headers configuration installed");
        config
    }

    /// Replace the configuration registered under `name`.
    pub fn set_named(&self, name: impl Into<String>, config: Configuration) -> Arc<Configuration> {
        let name = name.into();
        let config = Arc::new(config);
        self.update(|registry| {
            registry.named.insert(name.clone(), Arc::clone(&config));
        });
        info!("🔒 Secure headers configuration '{}' installed", name);
        config
    }

    /// Install a default and any number of named configurations as one
    /// snapshot, so readers never observe half of a reload.
    pub fn replace_all(
        &self,
        default: Configuration,
        named: impl IntoIterator<Item = (String, Configuration)>,
    ) {
        let named: HashMap<String, Arc<Configuration>> = named
            .into_iter()
            .map(|(name, config)| (name, Arc::new(config)))
            .collect();
        let count = named.len();

        let default = Arc::new(default);
        self.update(|registry| {
            *registry = Registry {
                default: Some(default),
                named,
            }
        });

        info!(
            "🔒 Secure headers configured: default + {} named configuration(s)",
            count
        );
    }

    /// Look up a named configuration, or the default when `name` is `None`.
    pub fn get(&self, name: Option<&str>) -> Result<Arc<Configuration>, SecureHeadersError> {
        let registry = self.registry.load();
        let default = registry
            .default
            .as_ref()
            .ok_or(SecureHeadersError::NotConfigured)?;

        match name {
            None => Ok(Arc::clone(default)),
            Some(name) => registry
                .named
                .get(name)
                .cloned()
                .ok_or_else(|| SecureHeadersError::UnknownConfiguration(name.to_string())),
        }
    }

    pub fn default_config(&self) -> Result<Arc<Configuration>, SecureHeadersError> {
        self.get(None)
    }

    pub fn is_configured(&self) -> bool {
        self.registry.load().default.is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.load().named.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.load().named.keys().cloned().collect();
        names.sort();
        names
    }
}

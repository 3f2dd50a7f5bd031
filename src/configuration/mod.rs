use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::errors::SecureHeadersError;
use crate::headers::{HeaderConfig, HeaderKind, HeaderSetting};

pub mod validation;


pub use validation::{parse_csp_additions, validate};

static UNSET: HeaderSetting = HeaderSetting::Unset;

/// A validated set of per-header settings. Kinds that were never set use
/// the built-in secure default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    settings: BTreeMap<HeaderKind, HeaderSetting>,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    pub fn setting(&self, kind: HeaderKind) -> &HeaderSetting {
        self.settings.get(&kind).unwrap_or(&UNSET)
    }

    /// Start a new builder seeded with this configuration's settings.
    pub fn to_builder(&self) -> ConfigurationBuilder {
        ConfigurationBuilder {
            pending: self
                .settings
                .iter()
                .map(|(kind, setting)| (*kind, Pending::Setting(setting.clone())))
                .collect(),
        }
    }

    /// Build from a table keyed by header configuration keys, e.g. the
    /// `[headers.default]` section of the config file.
    pub fn from_table(table: &Map<String, Value>) -> Result<Self, SecureHeadersError> {
        let mut builder = Configuration::builder();
        for (key, value) in table {
            let kind: HeaderKind = key.parse()?;
            builder.set_raw(kind, value.clone());
        }
        builder.build()
    }

    pub fn opted_out(&self) -> impl Iterator<Item = HeaderKind> + '_ {
        self.settings
            .iter()
            .filter(|(_, setting)| setting.is_opt_out())
            .map(|(kind, _)| *kind)
    }
}

#[derive(Debug, Clone)]
enum Pending {
    Raw(Value),
    Setting(HeaderSetting),
}

/// Collects settings and validates all of them in [`ConfigurationBuilder::build`].
/// Nothing is checked before `build`, so a failing builder never produces a
/// partially valid configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    pending: BTreeMap<HeaderKind, Pending>,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a typed value (or `HeaderSetting::OptOut`/`Unset`) for its kind.
    pub fn set(&mut self, kind: HeaderKind, setting: impl Into<HeaderSetting>) -> &mut Self {
        self.pending.insert(kind, Pending::Setting(setting.into()));
        self
    }

    /// Set a typed value, deriving the kind from the value.
    pub fn value(&mut self, value: impl Into<HeaderConfig>) -> &mut Self {
        let value = value.into();
        self.set(value.kind(), HeaderSetting::Value(value))
    }

    /// Set a loosely typed value, validated at `build` time.
    pub fn set_raw(&mut self, kind: HeaderKind, value: impl Into<Value>) -> &mut Self {
        self.pending.insert(kind, Pending::Raw(value.into()));
        self
    }

    pub fn opt_out(&mut self, kind: HeaderKind) -> &mut Self {
        self.set(kind, HeaderSetting::OptOut)
    }

    pub fn hsts(&mut self, value: impl Into<Value>) -> &mut Self {
        self.set_raw(HeaderKind::Hsts, value)
    }

    pub fn hpkp(&mut self, value: impl Into<Value>) -> &mut Self {
        self.set_raw(HeaderKind::Hpkp, value)
    }

    pub fn x_frame_options(&mut self, value: impl Into<Value>) -> &mut Self {
        self.set_raw(HeaderKind::XFrameOptions, value)
    }

    pub fn x_content_type_options(&mut self, value: impl Into<Value>) -> &mut Self {
        self.set_raw(HeaderKind::XContentTypeOptions, value)
    }

    pub fn x_xss_protection(&mut self, value: impl Into<Value>) -> &mut Self {
        self.set_raw(HeaderKind::XXssProtection, value)
    }

    pub fn x_download_options(&mut self, value: impl Into<Value>) -> &mut Self {
        self.set_raw(HeaderKind::XDownloadOptions, value)
    }

    pub fn x_permitted_cross_domain_policies(&mut self, value: impl Into<Value>) -> &mut Self {
        self.set_raw(HeaderKind::XPermittedCrossDomainPolicies, value)
    }

    pub fn csp(&mut self, value: impl Into<Value>) -> &mut Self {
        self.set_raw(HeaderKind::Csp, value)
    }

    pub fn build(&self) -> Result<Configuration, SecureHeadersError> {
        let mut settings = BTreeMap::new();
        for (kind, pending) in &self.pending {
            let setting = match pending {
                Pending::Raw(raw) => validation::validate(*kind, raw)?,
                Pending::Setting(setting) => {
                    if let HeaderSetting::Value(value) = setting {
                        if value.kind() != *kind {
                            return Err(SecureHeadersError::Config(format!(
                                "{} value supplied for {}",
                                value.kind(),
                                kind
                            )));
                        }
                        value.validate()?;
                    }
                    setting.clone()
                }
            };
            if setting != HeaderSetting::Unset {
                settings.insert(*kind, setting);
            }
        }
        Ok(Configuration { settings })
    }
}

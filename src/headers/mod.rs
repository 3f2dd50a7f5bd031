//! Typed header values and their validators.
//!
//! Every header this crate emits has a value type here. Constructing a value
//! through its parser or builder validates it, so a `HeaderConfig` held by a
//! `Configuration` is always renderable.

use std::fmt;
use std::str::FromStr;

use crate::errors::SecureHeadersError;

pub mod csp;
pub mod hpkp;
pub mod hsts;
pub mod x_content_type_options;
pub mod x_download_options;
pub mod x_frame_options;
pub mod x_permitted_cross_domain_policies;
pub mod x_xss_protection;


pub use csp::{ContentSecurityPolicy, CspBuilder, Directive, DirectiveTable};
pub use hpkp::{Pin, PublicKeyPins};
pub use hsts::StrictTransportSecurity;
pub use x_content_type_options::XContentTypeOptions;
pub use x_download_options::XDownloadOptions;
pub use x_frame_options::XFrameOptions;
pub use x_permitted_cross_domain_policies::XPermittedCrossDomainPolicies;
pub use x_xss_protection::XXssProtection;

/// The closed set of headers managed by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeaderKind {
    Hsts,
    Hpkp,
    XFrameOptions,
    XContentTypeOptions,
    XXssProtection,
    XDownloadOptions,
    XPermittedCrossDomainPolicies,
    Csp,
}

impl HeaderKind {
    pub const ALL: [HeaderKind; 8] = [
        HeaderKind::Hsts,
        HeaderKind::Hpkp,
        HeaderKind::XFrameOptions,
        HeaderKind::XContentTypeOptions,
        HeaderKind::XXssProtection,
        HeaderKind::XDownloadOptions,
        HeaderKind::XPermittedCrossDomainPolicies,
        HeaderKind::Csp,
    ];

    /// Key used for this header in configuration files.
    pub fn config_key(self) -> &'static str {
        match self {
            HeaderKind::Hsts => "hsts",
            HeaderKind::Hpkp => "hpkp",
            HeaderKind::XFrameOptions => "x_frame_options",
            HeaderKind::XContentTypeOptions => "x_content_type_options",
            HeaderKind::XXssProtection => "x_xss_protection",
            HeaderKind::XDownloadOptions => "x_download_options",
            HeaderKind::XPermittedCrossDomainPolicies => "x_permitted_cross_domain_policies",
            HeaderKind::Csp => "csp",
        }
    }

    /// Enforcing header name. CSP and HPKP switch to their report-only name
    /// based on the configured value, see [`HeaderConfig::header_name`].
    pub fn header_name(self) -> &'static str {
        match self {
            HeaderKind::Hsts => hsts::HEADER_NAME,
            HeaderKind::Hpkp => hpkp::HEADER_NAME,
            HeaderKind::XFrameOptions => x_frame_options::HEADER_NAME,
            HeaderKind::XContentTypeOptions => x_content_type_options::HEADER_NAME,
            HeaderKind::XXssProtection => x_xss_protection::HEADER_NAME,
            HeaderKind::XDownloadOptions => x_download_options::HEADER_NAME,
            HeaderKind::XPermittedCrossDomainPolicies => {
                x_permitted_cross_domain_policies::HEADER_NAME
            }
            HeaderKind::Csp => csp::HEADER_NAME,
        }
    }

    /// HSTS and HPKP are only meaningful over an encrypted connection.
    pub fn requires_secure_transport(self) -> bool {
        matches!(self, HeaderKind::Hsts | HeaderKind::Hpkp)
    }
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_name())
    }
}

impl FromStr for HeaderKind {
    type Err = SecureHeadersError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let normalized = key.trim().to_ascii_lowercase().replace('-', "_");
        HeaderKind::ALL
            .into_iter()
            .find(|kind| kind.config_key() == normalized)
            .ok_or_else(|| SecureHeadersError::UnknownHeader(key.to_string()))
    }
}

/// A validated value for one header kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderConfig {
    Hsts(StrictTransportSecurity),
    Hpkp(PublicKeyPins),
    XFrameOptions(XFrameOptions),
    XContentTypeOptions(XContentTypeOptions),
    XXssProtection(XXssProtection),
    XDownloadOptions(XDownloadOptions),
    XPermittedCrossDomainPolicies(XPermittedCrossDomainPolicies),
    Csp(ContentSecurityPolicy),
}

impl HeaderConfig {
    pub fn kind(&self) -> HeaderKind {
        match self {
            HeaderConfig::Hsts(_) => HeaderKind::Hsts,
            HeaderConfig::Hpkp(_) => HeaderKind::Hpkp,
            HeaderConfig::XFrameOptions(_) => HeaderKind::XFrameOptions,
            HeaderConfig::XContentTypeOptions(_) => HeaderKind::XContentTypeOptions,
            HeaderConfig::XXssProtection(_) => HeaderKind::XXssProtection,
            HeaderConfig::XDownloadOptions(_) => HeaderKind::XDownloadOptions,
            HeaderConfig::XPermittedCrossDomainPolicies(_) => {
                HeaderKind::XPermittedCrossDomainPolicies
            }
            HeaderConfig::Csp(_) => HeaderKind::Csp,
        }
    }

    /// Built-in secure default used when a configuration leaves a kind unset.
    /// HPKP has no safe default and stays absent.
    pub fn default_for(kind: HeaderKind) -> Option<HeaderConfig> {
        match kind {
            HeaderKind::Hsts => Some(HeaderConfig::Hsts(StrictTransportSecurity::default())),
            HeaderKind::Hpkp => None,
            HeaderKind::XFrameOptions => Some(HeaderConfig::XFrameOptions(XFrameOptions::default())),
            HeaderKind::XContentTypeOptions => {
                Some(HeaderConfig::XContentTypeOptions(XContentTypeOptions))
            }
            HeaderKind::XXssProtection => {
                Some(HeaderConfig::XXssProtection(XXssProtection::default()))
            }
            HeaderKind::XDownloadOptions => Some(HeaderConfig::XDownloadOptions(XDownloadOptions)),
            HeaderKind::XPermittedCrossDomainPolicies => Some(
                HeaderConfig::XPermittedCrossDomainPolicies(XPermittedCrossDomainPolicies::default()),
            ),
            HeaderKind::Csp => Some(HeaderConfig::Csp(ContentSecurityPolicy::default())),
        }
    }

    /// Re-check invariants that typed construction cannot rule out.
    pub fn validate(&self) -> Result<(), SecureHeadersError> {
        match self {
            HeaderConfig::Hsts(value) => value.validate(),
            HeaderConfig::Hpkp(value) => value.validate(),
            HeaderConfig::XFrameOptions(value) => value.validate(),
            HeaderConfig::XXssProtection(value) => value.validate(),
            HeaderConfig::Csp(value) => value.validate(),
            _ => Ok(()),
        }
    }

    /// Output header name, taking report-only modes into account.
    pub fn header_name(&self) -> &'static str {
        match self {
            HeaderConfig::Csp(csp) => csp.header_name(),
            HeaderConfig::Hpkp(hpkp) => hpkp.header_name(),
            other => other.kind().header_name(),
        }
    }
}

macro_rules! impl_from_value {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for HeaderConfig {
                fn from(value: $ty) -> Self {
                    HeaderConfig::$variant(value)
                }
            }

            impl From<$ty> for HeaderSetting {
                fn from(value: $ty) -> Self {
                    HeaderSetting::Value(HeaderConfig::$variant(value))
                }
            }
        )*
    };
}

impl_from_value! {
    Hsts => StrictTransportSecurity,
    Hpkp => PublicKeyPins,
    XFrameOptions => XFrameOptions,
    XContentTypeOptions => XContentTypeOptions,
    XXssProtection => XXssProtection,
    XDownloadOptions => XDownloadOptions,
    XPermittedCrossDomainPolicies => XPermittedCrossDomainPolicies,
    Csp => ContentSecurityPolicy,
}

/// How a configuration treats one header kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeaderSetting {
    /// Use the built-in secure default.
    #[default]
    Unset,
    /// Never emit this header.
    OptOut,
    Value(HeaderConfig),
}

impl HeaderSetting {
    pub fn is_opt_out(&self) -> bool {
        matches!(self, HeaderSetting::OptOut)
    }
}

impl From<HeaderConfig> for HeaderSetting {
    fn from(value: HeaderConfig) -> Self {
        HeaderSetting::Value(value)
    }
}

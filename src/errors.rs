use thiserror::Error;

use crate::headers::HeaderKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecureHeadersError {
    #[error("Secure headers are not configured: call configure_default before use")]
    NotConfigured,

    #[error("Unknown named configuration: {0}")]
    UnknownConfiguration(String),

    #[error("Unknown header configuration key: {0}")]
    UnknownHeader(String),

    #[error("STS configuration error: {key} = {value}")]
    Sts { key: String, value: String },

    #[error("Public-Key-Pins configuration error: {key} = {value}")]
    PublicKeyPins { key: String, value: String },

    #[error("X-Frame-Options configuration error: {value}")]
    XFrameOptions { value: String },

    #[error("X-Content-Type-Options configuration error: {value}")]
    XContentTypeOptions { value: String },

    #[error("X-XSS-Protection configuration error: {value}")]
    XXssProtection { value: String },

    #[error("X-Download-Options configuration error: {value}")]
    XDownloadOptions { value: String },

    #[error("X-Permitted-Cross-Domain-Policies configuration error: {value}")]
    XPermittedCrossDomainPolicies { value: String },

    #[error("Content-Security-Policy configuration error: {0}")]
    ContentSecurityPolicy(#[from] CspConfigError),

    #[error("{0} does not support appending")]
    AppendUnsupported(HeaderKind),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CspConfigError {
    #[error("unknown directive '{0}'")]
    UnknownDirective(String),

    #[error("invalid source '{value}' for {directive}")]
    InvalidSource { directive: String, value: String },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl SecureHeadersError {
    pub(crate) fn sts(key: &str, value: impl ToString) -> Self {
        SecureHeadersError::Sts {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn hpkp(key: &str, value: impl ToString) -> Self {
        SecureHeadersError::PublicKeyPins {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// The header kind this error was raised for, if any.
    pub fn kind(&self) -> Option<HeaderKind> {
        match self {
            SecureHeadersError::Sts { .. } => Some(HeaderKind::Hsts),
            SecureHeadersError::PublicKeyPins { .. } => Some(HeaderKind::Hpkp),
            SecureHeadersError::XFrameOptions { .. } => Some(HeaderKind::XFrameOptions),
            SecureHeadersError::XContentTypeOptions { .. } => Some(HeaderKind::XContentTypeOptions),
            SecureHeadersError::XXssProtection { .. } => Some(HeaderKind::XXssProtection),
            SecureHeadersError::XDownloadOptions { .. } => Some(HeaderKind::XDownloadOptions),
            SecureHeadersError::XPermittedCrossDomainPolicies { .. } => {
                Some(HeaderKind::XPermittedCrossDomainPolicies)
            }
            SecureHeadersError::ContentSecurityPolicy(_) => Some(HeaderKind::Csp),
            SecureHeadersError::AppendUnsupported(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for SecureHeadersError {
    fn from(err: toml::de::Error) -> Self {
        SecureHeadersError::Config(format!("Failed to parse config file: {err}"))
    }
}

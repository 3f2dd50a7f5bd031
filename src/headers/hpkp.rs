use tracing::warn;

use crate::errors::SecureHeadersError;

pub const HEADER_NAME: &str = "Public-Key-Pins";
pub const REPORT_ONLY_HEADER_NAME: &str = "Public-Key-Pins-Report-Only";

/// A single pinned public key, identified by its base64 SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    pub sha256: String,
}

impl Pin {
    pub fn sha256(digest: impl Into<String>) -> Self {
        Self {
            sha256: digest.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyPins {
    pub max_age: u64,
    pub pins: Vec<Pin>,
    pub include_subdomains: bool,
    pub report_uri: Option<String>,
    pub report_only: bool,
}

impl PublicKeyPins {
    pub fn new(max_age: u64, pins: Vec<Pin>) -> Self {
        Self {
            max_age,
            pins,
            include_subdomains: false,
            report_uri: None,
            report_only: false,
        }
    }

    pub fn include_subdomains(mut self, enabled: bool) -> Self {
        self.include_subdomains = enabled;
        self
    }

    pub fn report_uri(mut self, uri: impl Into<String>) -> Self {
        self.report_uri = Some(uri.into());
        self
    }

    pub fn report_only(mut self, enabled: bool) -> Self {
        self.report_only = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), SecureHeadersError> {
        if self.pins.is_empty() {
            return Err(SecureHeadersError::hpkp("pins", "[]"));
        }
        for pin in &self.pins {
            if !is_quotable(&pin.sha256) {
                return Err(SecureHeadersError::hpkp("sha256", &pin.sha256));
            }
        }
        if let Some(uri) = &self.report_uri {
            if !is_quotable(uri) {
                return Err(SecureHeadersError::hpkp("report_uri", uri));
            }
        }
        if self.pins.len() < 2 && !self.report_only {
            warn!("⚠️  HPKP enforced with a single pin; a backup pin is strongly recommended");
        }
        Ok(())
    }

    pub fn header_name(&self) -> &'static str {
        if self.report_only {
            REPORT_ONLY_HEADER_NAME
        } else {
            HEADER_NAME
        }
    }

    pub fn header_value(&self) -> String {
        let mut parts = vec![format!("max-age={}", self.max_age)];
        parts.extend(
            self.pins
                .iter()
                .map(|pin| format!("pin-sha256=\"{}\"", pin.sha256)),
        );
        if let Some(uri) = &self.report_uri {
            parts.push(format!("report-uri=\"{uri}\""));
        }
        if self.include_subdomains {
            parts.push("includeSubDomains".to_string());
        }
        parts.join("; ")
    }
}

fn is_quotable(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|c| c == '"' || c.is_whitespace() || c.is_ascii_control())
}

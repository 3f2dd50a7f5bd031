use std::str::FromStr;

use tracing::warn;

use crate::errors::SecureHeadersError;

pub const HEADER_NAME: &str = "Strict-Transport-Security";

/// Twenty years, in seconds.
pub const DEFAULT_MAX_AGE: u64 = 631_138_519;

/// Browsers treat anything shorter than 18 weeks as too short to be useful.
const MIN_RECOMMENDED_MAX_AGE: u64 = 10_886_400;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictTransportSecurity {
    pub max_age: u64,
    pub include_subdomains: bool,
    pub preload: bool,
}

impl Default for StrictTransportSecurity {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE)
    }
}

impl StrictTransportSecurity {
    pub fn new(max_age: u64) -> Self {
        Self {
            max_age,
            include_subdomains: false,
            preload: false,
        }
    }

    pub fn include_subdomains(mut self, enabled: bool) -> Self {
        self.include_subdomains = enabled;
        self
    }

    pub fn preload(mut self, enabled: bool) -> Self {
        self.preload = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), SecureHeadersError> {
        if self.max_age < MIN_RECOMMENDED_MAX_AGE {
            warn!(
                "⚠️  HSTS max-age={} is below the recommended 18 weeks",
                self.max_age
            );
        }
        if self.preload && !self.include_subdomains {
            warn!("⚠️  HSTS preload requested without includeSubDomains; preload lists will reject it");
        }
        Ok(())
    }

    pub fn header_value(&self) -> String {
        let mut value = format!("max-age={}", self.max_age);
        if self.include_subdomains {
            value.push_str("; includeSubDomains");
        }
        if self.preload {
            value.push_str("; preload");
        }
        value
    }
}

impl FromStr for StrictTransportSecurity {
    type Err = SecureHeadersError;

    /// Parses the header form, e.g. `max-age=31536000; includeSubDomains`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(';').map(str::trim);

        let max_age = parts
            .next()
            .and_then(|first| {
                let (name, value) = first.split_once('=')?;
                if !name.trim().eq_ignore_ascii_case("max-age") {
                    return None;
                }
                let value = value.trim().trim_matches('"');
                if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                value.parse::<u64>().ok()
            })
            .ok_or_else(|| SecureHeadersError::sts("hsts", s))?;

        let mut hsts = StrictTransportSecurity::new(max_age);
        for part in parts.filter(|p| !p.is_empty()) {
            if part.eq_ignore_ascii_case("includeSubDomains") {
                hsts.include_subdomains = true;
            } else if part.eq_ignore_ascii_case("preload") {
                hsts.preload = true;
            } else {
                return Err(SecureHeadersError::sts("hsts", s));
            }
        }

        Ok(hsts)
    }
}

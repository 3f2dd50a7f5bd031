use std::str::FromStr;

use crate::errors::SecureHeadersError;

pub const HEADER_NAME: &str = "X-Frame-Options";

const ALLOW_FROM: &str = "ALLOW-FROM";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum XFrameOptions {
    Deny,
    #[default]
    SameOrigin,
    AllowFrom(String),
}

impl XFrameOptions {
    pub fn validate(&self) -> Result<(), SecureHeadersError> {
        if let XFrameOptions::AllowFrom(uri) = self {
            if uri.trim().is_empty()
                || uri
                    .chars()
                    .any(|c| c.is_whitespace() || c.is_ascii_control())
            {
                return Err(SecureHeadersError::XFrameOptions {
                    value: self.header_value(),
                });
            }
        }
        Ok(())
    }

    pub fn header_value(&self) -> String {
        match self {
            XFrameOptions::Deny => "DENY".to_string(),
            XFrameOptions::SameOrigin => "SAMEORIGIN".to_string(),
            XFrameOptions::AllowFrom(uri) => format!("{ALLOW_FROM} {uri}"),
        }
    }
}

impl FromStr for XFrameOptions {
    type Err = SecureHeadersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SecureHeadersError::XFrameOptions {
            value: s.to_string(),
        };
        let trimmed = s.trim();

        if trimmed.eq_ignore_ascii_case("DENY") {
            return Ok(XFrameOptions::Deny);
        }
        if trimmed.eq_ignore_ascii_case("SAMEORIGIN") {
            return Ok(XFrameOptions::SameOrigin);
        }

        let prefix = trimmed.get(..ALLOW_FROM.len()).ok_or_else(invalid)?;
        if !prefix.eq_ignore_ascii_case(ALLOW_FROM) {
            return Err(invalid());
        }
        let rest = &trimmed[ALLOW_FROM.len()..];
        // "ALLOW-FROM uri" and "ALLOW-FROM: uri" are both seen in the wild
        if !rest.starts_with(|c: char| c == ':' || c.is_whitespace()) {
            return Err(invalid());
        }
        let uri = rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
        let value = XFrameOptions::AllowFrom(uri.to_string());
        value.validate().map_err(|_| invalid())?;
        Ok(value)
    }
}

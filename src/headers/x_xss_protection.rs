use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::SecureHeadersError;

pub const HEADER_NAME: &str = "X-XSS-Protection";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum XXssProtection {
    /// `0`
    Disabled,
    /// `1`
    Enabled,
    /// `1; mode=block`
    #[default]
    Block,
    /// `1; report=<uri>`
    Report(String),
}

fn report_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^1;\s*report=(\S+)$").expect("X-XSS-Protection report pattern is valid")
    })
}

impl XXssProtection {
    /// A report URI must survive the round trip through `1; report=<uri>`.
    pub fn validate(&self) -> Result<(), SecureHeadersError> {
        if let XXssProtection::Report(uri) = self {
            let value = self.header_value();
            if uri.chars().any(|c| c.is_ascii_control()) || !report_pattern().is_match(&value) {
                return Err(SecureHeadersError::XXssProtection { value });
            }
        }
        Ok(())
    }

    pub fn header_value(&self) -> String {
        match self {
            XXssProtection::Disabled => "0".to_string(),
            XXssProtection::Enabled => "1".to_string(),
            XXssProtection::Block => "1; mode=block".to_string(),
            XXssProtection::Report(uri) => format!("1; report={uri}"),
        }
    }
}

impl FromStr for XXssProtection {
    type Err = SecureHeadersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "0" => Ok(XXssProtection::Disabled),
            "1" => Ok(XXssProtection::Enabled),
            "1; mode=block" | "1;mode=block" => Ok(XXssProtection::Block),
            _ => report_pattern()
                .captures(trimmed)
                .map(|caps| XXssProtection::Report(caps[1].to_string()))
                .filter(|parsed| parsed.validate().is_ok())
                .ok_or_else(|| SecureHeadersError::XXssProtection {
                    value: s.to_string(),
                }),
        }
    }
}

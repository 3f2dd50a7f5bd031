use std::str::FromStr;

use crate::errors::SecureHeadersError;

pub const HEADER_NAME: &str = "X-Download-Options";

/// Stops IE from opening downloads in the site's context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XDownloadOptions;

impl XDownloadOptions {
    pub fn header_value(&self) -> String {
        "noopen".to_string()
    }
}

impl FromStr for XDownloadOptions {
    type Err = SecureHeadersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "noopen" {
            Ok(XDownloadOptions)
        } else {
            Err(SecureHeadersError::XDownloadOptions {
                value: s.to_string(),
            })
        }
    }
}

use std::str::FromStr;

use crate::errors::SecureHeadersError;

pub const HEADER_NAME: &str = "X-Content-Type-Options";

/// `nosniff` is the only value browsers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XContentTypeOptions;

impl XContentTypeOptions {
    pub fn header_value(&self) -> String {
        "nosniff".to_string()
    }
}

impl FromStr for XContentTypeOptions {
    type Err = SecureHeadersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "nosniff" {
            Ok(XContentTypeOptions)
        } else {
            Err(SecureHeadersError::XContentTypeOptions {
                value: s.to_string(),
            })
        }
    }
}

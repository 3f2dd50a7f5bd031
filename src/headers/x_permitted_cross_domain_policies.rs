use std::str::FromStr;

use crate::errors::SecureHeadersError;

pub const HEADER_NAME: &str = "X-Permitted-Cross-Domain-Policies";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XPermittedCrossDomainPolicies {
    #[default]
    None,
    MasterOnly,
    ByContentType,
    ByFtpFilename,
    All,
}

impl XPermittedCrossDomainPolicies {
    const ALL: [XPermittedCrossDomainPolicies; 5] = [
        XPermittedCrossDomainPolicies::None,
        XPermittedCrossDomainPolicies::MasterOnly,
        XPermittedCrossDomainPolicies::ByContentType,
        XPermittedCrossDomainPolicies::ByFtpFilename,
        XPermittedCrossDomainPolicies::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            XPermittedCrossDomainPolicies::None => "none",
            XPermittedCrossDomainPolicies::MasterOnly => "master-only",
            XPermittedCrossDomainPolicies::ByContentType => "by-content-type",
            XPermittedCrossDomainPolicies::ByFtpFilename => "by-ftp-filename",
            XPermittedCrossDomainPolicies::All => "all",
        }
    }

    pub fn header_value(&self) -> String {
        self.as_str().to_string()
    }
}

impl FromStr for XPermittedCrossDomainPolicies {
    type Err = SecureHeadersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| SecureHeadersError::XPermittedCrossDomainPolicies {
                value: s.to_string(),
            })
    }
}

//! Classifies a user agent into the capability tier used by the CSP renderer.
//!
//! The thresholds live in [`NONCE_SUPPORT`] so they can be updated without
//! touching the resolver.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Browser {
    Edge,
    Opera,
    InternetExplorer,
    Firefox,
    Chrome,
    Safari,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapabilityTier {
    /// No CSP Level 2 nonce support, or unknown client.
    #[default]
    Legacy,
    NonceCapable,
}

impl CapabilityTier {
    pub fn supports_nonces(self) -> bool {
        self == CapabilityTier::NonceCapable
    }
}

struct BrowserRule {
    browser: Browser,
    /// Product token preceding the version, e.g. `Firefox/`.
    marker: &'static str,
    /// Extra token the user agent must also contain.
    requires: Option<&'static str>,
    /// First major version with nonce support; `None` means never.
    min_nonce_version: Option<u32>,
}

/// Checked in order: Edge and Opera also advertise `Chrome/`, and Chrome
/// advertises `Safari/`.
const NONCE_SUPPORT: &[BrowserRule] = &[
    BrowserRule {
        browser: Browser::Edge,
        marker: "Edg/",
        requires: None,
        min_nonce_version: Some(79),
    },
    BrowserRule {
        browser: Browser::Edge,
        marker: "Edge/",
        requires: None,
        min_nonce_version: Some(15),
    },
    BrowserRule {
        browser: Browser::Opera,
        marker: "OPR/",
        requires: None,
        min_nonce_version: Some(27),
    },
    BrowserRule {
        browser: Browser::InternetExplorer,
        marker: "MSIE ",
        requires: None,
        min_nonce_version: None,
    },
    BrowserRule {
        browser: Browser::InternetExplorer,
        marker: "Trident/",
        requires: None,
        min_nonce_version: None,
    },
    BrowserRule {
        browser: Browser::Firefox,
        marker: "Firefox/",
        requires: None,
        min_nonce_version: Some(31),
    },
    BrowserRule {
        browser: Browser::Chrome,
        marker: "CriOS/",
        requires: None,
        min_nonce_version: Some(40),
    },
    BrowserRule {
        browser: Browser::Chrome,
        marker: "Chrome/",
        requires: None,
        min_nonce_version: Some(40),
    },
    BrowserRule {
        browser: Browser::Safari,
        marker: "Version/",
        requires: Some("Safari/"),
        min_nonce_version: Some(10),
    },
];

/// Identify the browser family and major version, if recognized.
pub fn detect(user_agent: &str) -> Option<(Browser, u32)> {
    NONCE_SUPPORT
        .iter()
        .find(|rule| matches_rule(rule, user_agent))
        .and_then(|rule| Some((rule.browser, major_version(user_agent, rule.marker)?)))
}

/// Classify a client. Absent or unrecognized user agents get the most
/// conservative tier.
pub fn classify(user_agent: Option<&str>) -> CapabilityTier {
    let Some(user_agent) = user_agent else {
        return CapabilityTier::Legacy;
    };

    let Some(rule) = NONCE_SUPPORT
        .iter()
        .find(|rule| matches_rule(rule, user_agent))
    else {
        return CapabilityTier::Legacy;
    };

    match (rule.min_nonce_version, major_version(user_agent, rule.marker)) {
        (Some(min), Some(version)) if version >= min => CapabilityTier::NonceCapable,
        _ => CapabilityTier::Legacy,
    }
}

fn matches_rule(rule: &BrowserRule, user_agent: &str) -> bool {
    user_agent.contains(rule.marker)
        && rule
            .requires
            .map_or(true, |required| user_agent.contains(required))
}

fn major_version(user_agent: &str, marker: &str) -> Option<u32> {
    let start = user_agent.find(marker)? + marker.len();
    let digits: String = user_agent[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

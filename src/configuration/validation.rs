//! Turns loosely typed values (TOML tables, `serde_json::json!` literals) into
//! validated header settings.

use serde_json::{Map, Value};

use crate::errors::{CspConfigError, SecureHeadersError};
use crate::headers::{
    ContentSecurityPolicy, Directive, DirectiveTable, HeaderConfig, HeaderKind, HeaderSetting, Pin,
    PublicKeyPins, StrictTransportSecurity, XContentTypeOptions, XDownloadOptions, XFrameOptions,
    XPermittedCrossDomainPolicies, XXssProtection,
};

const CSP_FLAGS: [&str; 4] = [
    "report_only",
    "preserve_schemes",
    "block_all_mixed_content",
    "upgrade_insecure_requests",
];

/// Validate a raw value for `kind`.
///
/// `false` opts out, `null` and `true` keep the built-in default, anything
/// else must be a valid value for the header.
pub fn validate(kind: HeaderKind, raw: &Value) -> Result<HeaderSetting, SecureHeadersError> {
    match raw {
        Value::Bool(false) => return Ok(HeaderSetting::OptOut),
        Value::Null | Value::Bool(true) => return Ok(HeaderSetting::Unset),
        _ => {}
    }

    let config = match kind {
        HeaderKind::Hsts => HeaderConfig::Hsts(parse_hsts(raw)?),
        HeaderKind::Hpkp => HeaderConfig::Hpkp(parse_hpkp(raw)?),
        HeaderKind::XFrameOptions => HeaderConfig::XFrameOptions(
            expect_str(raw, |value| SecureHeadersError::XFrameOptions { value })?
                .parse::<XFrameOptions>()?,
        ),
        HeaderKind::XContentTypeOptions => HeaderConfig::XContentTypeOptions(
            expect_str(raw, |value| SecureHeadersError::XContentTypeOptions { value })?
                .parse::<XContentTypeOptions>()?,
        ),
        HeaderKind::XXssProtection => HeaderConfig::XXssProtection(
            expect_str(raw, |value| SecureHeadersError::XXssProtection { value })?
                .parse::<XXssProtection>()?,
        ),
        HeaderKind::XDownloadOptions => HeaderConfig::XDownloadOptions(
            expect_str(raw, |value| SecureHeadersError::XDownloadOptions { value })?
                .parse::<XDownloadOptions>()?,
        ),
        HeaderKind::XPermittedCrossDomainPolicies => HeaderConfig::XPermittedCrossDomainPolicies(
            expect_str(raw, |value| SecureHeadersError::XPermittedCrossDomainPolicies { value })?
                .parse::<XPermittedCrossDomainPolicies>()?,
        ),
        HeaderKind::Csp => HeaderConfig::Csp(parse_csp(raw)?),
    };

    config.validate()?;
    Ok(HeaderSetting::Value(config))
}

/// Parse the partial policy passed to an append: directives only, no flags.
pub fn parse_csp_additions(raw: &Value) -> Result<DirectiveTable, SecureHeadersError> {
    let map = raw.as_object().ok_or_else(|| CspConfigError::InvalidValue {
        key: "csp".to_string(),
        value: raw.to_string(),
    })?;

    let mut table = DirectiveTable::new();
    for (key, value) in map {
        if CSP_FLAGS.contains(&flag_key(key).as_str()) {
            return Err(CspConfigError::InvalidValue {
                key: key.clone(),
                value: value.to_string(),
            }
            .into());
        }
        let directive: Directive = key.parse()?;
        table.append(directive, token_list(key, value)?)?;
    }
    Ok(table)
}

fn expect_str(
    raw: &Value,
    error: impl FnOnce(String) -> SecureHeadersError,
) -> Result<&str, SecureHeadersError> {
    raw.as_str().ok_or_else(|| error(raw.to_string()))
}

fn parse_hsts(raw: &Value) -> Result<StrictTransportSecurity, SecureHeadersError> {
    match raw {
        Value::String(s) => s.parse(),
        Value::Object(map) => {
            let max_age = map
                .get("max_age")
                .ok_or_else(|| SecureHeadersError::sts("max_age", "missing"))?;
            let max_age = max_age
                .as_u64()
                .ok_or_else(|| SecureHeadersError::sts("max_age", max_age))?;

            let mut hsts = StrictTransportSecurity::new(max_age);
            for (key, value) in map {
                match key.as_str() {
                    "max_age" => {}
                    "include_subdomains" => {
                        hsts.include_subdomains = value.as_bool()
                            .ok_or_else(|| SecureHeadersError::sts(key, value))?;
                    }
                    "preload" => {
                        hsts.preload = value.as_bool()
                            .ok_or_else(|| SecureHeadersError::sts(key, value))?;
                    }
                    _ => return Err(SecureHeadersError::sts(key, value)),
                }
            }
            Ok(hsts)
        }
        other => Err(SecureHeadersError::sts("hsts", other)),
    }
}

fn parse_hpkp(raw: &Value) -> Result<PublicKeyPins, SecureHeadersError> {
    let map = raw
        .as_object()
        .ok_or_else(|| SecureHeadersError::hpkp("hpkp", raw))?;

    let max_age = map
        .get("max_age")
        .ok_or_else(|| SecureHeadersError::hpkp("max_age", "missing"))?;
    let max_age = max_age
        .as_u64()
        .ok_or_else(|| SecureHeadersError::hpkp("max_age", max_age))?;

    let mut hpkp = PublicKeyPins::new(max_age, Vec::new());
    for (key, value) in map {
        match key.as_str() {
            "max_age" => {}
            "pins" => hpkp.pins = parse_pins(value)?,
            "include_subdomains" => {
                hpkp.include_subdomains =
                    value.as_bool().ok_or_else(|| SecureHeadersError::hpkp(key, value))?;
            }
            "report_only" => {
                hpkp.report_only =
                    value.as_bool().ok_or_else(|| SecureHeadersError::hpkp(key, value))?;
            }
            "report_uri" => {
                let uri = value
                    .as_str()
                    .ok_or_else(|| SecureHeadersError::hpkp(key, value))?;
                hpkp.report_uri = Some(uri.to_string());
            }
            _ => return Err(SecureHeadersError::hpkp(key, value)),
        }
    }
    Ok(hpkp)
}

fn parse_pins(raw: &Value) -> Result<Vec<Pin>, SecureHeadersError> {
    let pins = raw
        .as_array()
        .ok_or_else(|| SecureHeadersError::hpkp("pins", raw))?;

    pins.iter()
        .map(|pin| {
            pin.get("sha256")
                .and_then(Value::as_str)
                .map(Pin::sha256)
                .ok_or_else(|| SecureHeadersError::hpkp("pins", pin))
        })
        .collect()
}

fn parse_csp(raw: &Value) -> Result<ContentSecurityPolicy, SecureHeadersError> {
    let map: &Map<String, Value> = raw.as_object().ok_or_else(|| CspConfigError::InvalidValue {
        key: "csp".to_string(),
        value: raw.to_string(),
    })?;

    let mut policy = ContentSecurityPolicy::from_directives(DirectiveTable::new());
    for (key, value) in map {
        let flag = flag_key(key);
        if CSP_FLAGS.contains(&flag.as_str()) {
            let enabled = value.as_bool().ok_or_else(|| CspConfigError::InvalidValue {
                key: key.clone(),
                value: value.to_string(),
            })?;
            match flag.as_str() {
                "report_only" => policy.report_only = enabled,
                "preserve_schemes" => policy.preserve_schemes = enabled,
                "block_all_mixed_content" => policy.block_all_mixed_content = enabled,
                _ => policy.upgrade_insecure_requests = enabled,
            }
            continue;
        }

        let directive: Directive = key.parse()?;
        policy
            .directives
            .insert(directive, token_list(key, value)?)?;
    }
    Ok(policy)
}

fn token_list<'a>(key: &str, value: &'a Value) -> Result<Vec<&'a str>, CspConfigError> {
    let invalid = || CspConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };
    match value {
        // `sandbox = true` is the bare, fully restrictive form
        Value::Bool(true) if key == "sandbox" => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

fn flag_key(key: &str) -> String {
    key.to_ascii_lowercase().replace('-', "_")
}

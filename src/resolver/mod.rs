//! Merges a base configuration with a request's override record and renders
//! the result.
//!
//! Per kind: opt-outs drop the header, HSTS/HPKP are dropped on plaintext
//! requests, an override replaces the base value, appends are merged on top
//! and the result is serialized. Resolution cannot fail: every input has
//! already been validated.

use std::borrow::Cow;
use std::collections::BTreeMap;

use tracing::debug;

use crate::configuration::Configuration;
use crate::headers::{HeaderConfig, HeaderKind, HeaderSetting};
use crate::request::{OverrideRecord, Replacement, RequestContext};
use crate::serializer;


/// Header name to header value, for every header that applies.
pub type ResolvedHeaderSet = BTreeMap<String, String>;

/// The merged value for one kind, or `None` if the header is not emitted.
pub fn resolve_value<'a>(
    kind: HeaderKind,
    base: &'a Configuration,
    overrides: &'a OverrideRecord,
    secure: bool,
) -> Option<Cow<'a, HeaderConfig>> {
    let effective = overrides.effective(kind);

    let value = match effective.replacement {
        Some(Replacement::OptOut) => return None,
        Some(Replacement::Value(value)) => Cow::Borrowed(value),
        None => match base.setting(kind) {
            HeaderSetting::OptOut => return None,
            HeaderSetting::Unset => Cow::Owned(HeaderConfig::default_for(kind)?),
            HeaderSetting::Value(value) => Cow::Borrowed(value),
        },
    };

    if kind.requires_secure_transport() && !secure {
        debug!("Omitting {} on a plaintext request", kind);
        return None;
    }

    if effective.appends.is_empty() {
        return Some(value);
    }

    match value.into_owned() {
        HeaderConfig::Csp(mut csp) => {
            for additions in effective.appends {
                csp.directives.merge(additions);
            }
            Some(Cow::Owned(HeaderConfig::Csp(csp)))
        }
        // appends are only ever recorded for CSP
        other => Some(Cow::Owned(other)),
    }
}

/// Resolve and render every header kind.
///
/// `nonce` is injected into CSP; pass `None` when the client cannot use it
/// or no nonce was requested.
pub fn resolve(
    base: &Configuration,
    overrides: &OverrideRecord,
    secure: bool,
    nonce: Option<&str>,
) -> ResolvedHeaderSet {
    HeaderKind::ALL
        .into_iter()
        .filter_map(|kind| resolve_value(kind, base, overrides, secure))
        .map(|value| {
            let (name, rendered) = serializer::serialize(&value, nonce);
            (name.to_string(), rendered)
        })
        .collect()
}

/// Resolve for a request context, honouring its capability tier and nonce.
pub fn resolve_request(base: &Configuration, context: &RequestContext) -> ResolvedHeaderSet {
    let nonce = context
        .nonce()
        .filter(|_| context.tier().supports_nonces());
    resolve(base, context.overrides(), context.is_secure(), nonce)
}

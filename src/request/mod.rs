//! Request-scoped state: which configuration applies, the override record,
//! the client's capability tier and the memoized nonce.
//!
//! A `RequestContext` is created per inbound request and dropped with it, so
//! nothing here is shared between concurrently handled requests.

use std::collections::BTreeMap;

use crate::capability::{self, CapabilityTier};
use crate::headers::{DirectiveTable, HeaderConfig, HeaderKind};
use crate::nonce::{NonceGenerator, RequestNonce};

#[cfg(test)]
mod tests;

/// One request-level change to a header kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideOp {
    OptOut,
    /// Replace the configured value wholesale.
    Override(HeaderConfig),
    /// Add CSP directive tokens on top of the active value.
    Append(DirectiveTable),
}

/// The last unconditional operation recorded for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement<'a> {
    OptOut,
    Value(&'a HeaderConfig),
}

/// Outcome of folding a kind's operations in call order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EffectiveOverride<'a> {
    pub replacement: Option<Replacement<'a>>,
    /// Appends issued after the last opt-out/override, in call order.
    pub appends: Vec<&'a DirectiveTable>,
}

impl EffectiveOverride<'_> {
    pub fn is_opted_out(&self) -> bool {
        self.replacement == Some(Replacement::OptOut)
    }
}

/// Ordered per-kind operations recorded during one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideRecord {
    ops: BTreeMap<HeaderKind, Vec<OverrideOp>>,
}

impl OverrideRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: HeaderKind, op: OverrideOp) {
        self.ops.entry(kind).or_default().push(op);
    }

    pub fn ops(&self, kind: HeaderKind) -> &[OverrideOp] {
        self.ops.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Fold the operations for `kind`: the last opt-out or override wins and
    /// discards appends issued before it.
    pub fn effective(&self, kind: HeaderKind) -> EffectiveOverride<'_> {
        let mut effective = EffectiveOverride::default();
        for op in self.ops(kind) {
            match op {
                OverrideOp::OptOut => {
                    effective.replacement = Some(Replacement::OptOut);
                    effective.appends.clear();
                }
                OverrideOp::Override(value) => {
                    effective.replacement = Some(Replacement::Value(value));
                    effective.appends.clear();
                }
                OverrideOp::Append(table) => effective.appends.push(table),
            }
        }
        effective
    }
}

#[derive(Debug)]
pub struct RequestContext {
    secure: bool,
    user_agent: Option<String>,
    tier: CapabilityTier,
    config_name: Option<String>,
    overrides: OverrideRecord,
    nonce: RequestNonce,
}

impl RequestContext {
    /// `secure` is whether the request arrived over an encrypted connection.
    pub fn new(secure: bool, user_agent: Option<String>) -> Self {
        let tier = capability::classify(user_agent.as_deref());
        Self {
            secure,
            user_agent,
            tier,
            config_name: None,
            overrides: OverrideRecord::new(),
            nonce: RequestNonce::new(),
        }
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    /// Named configuration selected for this request; `None` is the default.
    pub fn config_name(&self) -> Option<&str> {
        self.config_name.as_deref()
    }

    pub fn overrides(&self) -> &OverrideRecord {
        &self.overrides
    }

    /// The nonce, if one was requested during this request.
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.get()
    }

    pub(crate) fn set_config_name(&mut self, name: impl Into<String>) {
        self.config_name = Some(name.into());
    }

    pub(crate) fn record(&mut self, kind: HeaderKind, op: OverrideOp) {
        self.overrides.push(kind, op);
    }

    pub(crate) fn nonce_or_generate(&self, generator: &dyn NonceGenerator) -> &str {
        self.nonce.get_or_generate(generator)
    }
}

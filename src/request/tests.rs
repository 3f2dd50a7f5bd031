use super::*;
use crate::headers::{Directive, XFrameOptions};
use crate::nonce::NonceGenerator;

struct FixedNonce;

impl NonceGenerator for FixedNonce {
    fn generate(&self) -> String {
        "fixed".to_string()
    }
}

fn additions(directive: Directive, token: &str) -> DirectiveTable {
    let mut table = DirectiveTable::new();
    table.insert(directive, [token]).unwrap();
    table
}

#[test]
fn test_no_ops_means_no_override() {
    let record = OverrideRecord::new();
    let effective = record.effective(HeaderKind::Csp);

    assert!(record.is_empty());
    assert_eq!(effective, EffectiveOverride::default());
    assert!(!effective.is_opted_out());
}

#[test]
fn test_last_unconditional_op_wins() {
    let deny = HeaderConfig::XFrameOptions(XFrameOptions::Deny);
    let mut record = OverrideRecord::new();

    record.push(HeaderKind::XFrameOptions, OverrideOp::OptOut);
    record.push(HeaderKind::XFrameOptions, OverrideOp::Override(deny.clone()));
    assert_eq!(
        record.effective(HeaderKind::XFrameOptions).replacement,
        Some(Replacement::Value(&deny))
    );

    record.push(HeaderKind::XFrameOptions, OverrideOp::OptOut);
    assert!(record.effective(HeaderKind::XFrameOptions).is_opted_out());
    assert_eq!(record.ops(HeaderKind::XFrameOptions).len(), 3);
}

#[test]
fn test_appends_accumulate_in_call_order() {
    let first = additions(Directive::ScriptSrc, "a.example.com");
    let second = additions(Directive::ImgSrc, "b.example.com");
    let mut record = OverrideRecord::new();

    record.push(HeaderKind::Csp, OverrideOp::Append(first.clone()));
    record.push(HeaderKind::Csp, OverrideOp::Append(second.clone()));

    let effective = record.effective(HeaderKind::Csp);
    assert_eq!(effective.replacement, None);
    assert_eq!(effective.appends, vec![&first, &second]);
}

#[test]
fn test_override_discards_earlier_appends() {
    let early = additions(Directive::ScriptSrc, "early.example.com");
    let late = additions(Directive::ScriptSrc, "late.example.com");
    let replacement = HeaderConfig::Csp(Default::default());
    let mut record = OverrideRecord::new();

    record.push(HeaderKind::Csp, OverrideOp::Append(early));
    record.push(HeaderKind::Csp, OverrideOp::Override(replacement.clone()));
    record.push(HeaderKind::Csp, OverrideOp::Append(late.clone()));

    let effective = record.effective(HeaderKind::Csp);
    assert_eq!(effective.replacement, Some(Replacement::Value(&replacement)));
    assert_eq!(effective.appends, vec![&late]);
}

#[test]
fn test_ops_are_tracked_per_kind() {
    let mut record = OverrideRecord::new();
    record.push(HeaderKind::Hsts, OverrideOp::OptOut);

    assert!(record.effective(HeaderKind::Hsts).is_opted_out());
    assert!(!record.effective(HeaderKind::Hpkp).is_opted_out());
    assert!(record.ops(HeaderKind::Csp).is_empty());
}

#[test]
fn test_request_context() {
    let mut context = RequestContext::new(
        true,
        Some("Mozilla/5.0 (X11; Linux x86_64; rv:115.0) Gecko/20100101 Firefox/115.0".to_string()),
    );

    assert!(context.is_secure());
    assert_eq!(context.tier(), CapabilityTier::NonceCapable);
    assert_eq!(context.config_name(), None);
    assert_eq!(context.nonce(), None);

    context.set_config_name("api");
    context.record(HeaderKind::Csp, OverrideOp::OptOut);
    assert_eq!(context.config_name(), Some("api"));
    assert!(context.overrides().effective(HeaderKind::Csp).is_opted_out());

    assert_eq!(context.nonce_or_generate(&FixedNonce), "fixed");
    assert_eq!(context.nonce(), Some("fixed"));
}

#[test]
fn test_request_without_user_agent_is_legacy() {
    let context = RequestContext::new(false, None);
    assert!(!context.is_secure());
    assert_eq!(context.user_agent(), None);
    assert_eq!(context.tier(), CapabilityTier::Legacy);
}

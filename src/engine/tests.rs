use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use super::*;
use crate::headers::{ContentSecurityPolicy, XFrameOptions, XXssProtection};

const MODERN_UA: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15";
const LEGACY_UA: &str = "Mozilla/5.0 (compatible; MSIE 10.0; Windows NT 6.1; Trident/6.0)";

/// Hands out `n0`, `n1`, ... so tests can tell nonces apart.
#[derive(Default)]
struct SequentialNonces(AtomicUsize);

impl NonceGenerator for SequentialNonces {
    fn generate(&self) -> String {
        format!("n{}", self.0.fetch_add(1, Ordering::SeqCst))
    }
}

fn engine() -> SecureHeaders {
    SecureHeaders::with_nonce_generator(Arc::new(SequentialNonces::default()))
}

fn configured() -> SecureHeaders {
    let engine = engine();
    engine
        .configure_default(|config| {
            config.csp(json!({
                "default_src": ["'self'"],
                "script_src": ["mycdn.com", "'unsafe-inline'"]
            }));
        })
        .unwrap();
    engine
}

fn secure_request() -> RequestContext {
    RequestContext::new(true, Some(MODERN_UA.to_string()))
}

#[test]
fn test_operations_before_configuration_fail() {
    let engine = engine();
    let mut context = secure_request();

    assert_eq!(
        engine.resolve_headers(&context).unwrap_err(),
        SecureHeadersError::NotConfigured
    );
    assert_eq!(
        engine
            .opt_out_of_header(&mut context, HeaderKind::Csp)
            .unwrap_err(),
        SecureHeadersError::NotConfigured
    );
    assert_eq!(
        engine
            .override_header(&mut context, XFrameOptions::Deny)
            .unwrap_err(),
        SecureHeadersError::NotConfigured
    );
    assert_eq!(
        engine
            .configure_named_from_default("api", |_| {})
            .unwrap_err(),
        SecureHeadersError::NotConfigured
    );
}

#[test]
fn test_invalid_default_leaves_previous_default_untouched() {
    let engine = engine();

    let err = engine
        .configure_default(|config| {
            config.hsts("lol");
        })
        .unwrap_err();
    assert!(matches!(err, SecureHeadersError::Sts { .. }));
    assert!(!engine.store().is_configured());

    engine
        .configure_default(|config| {
            config.x_frame_options("DENY");
        })
        .unwrap();
    let err = engine
        .configure_default(|config| {
            config.x_frame_options("SAMEORIGIN").hsts("lol");
        })
        .unwrap_err();
    assert!(matches!(err, SecureHeadersError::Sts { .. }));

    let headers = engine.resolve_headers(&secure_request()).unwrap();
    assert_eq!(headers["X-Frame-Options"], "DENY");
}

#[test]
fn test_default_headers() {
    let engine = engine();
    engine.configure_default(|_| {}).unwrap();

    let headers = engine.resolve_headers(&secure_request()).unwrap();
    assert_eq!(headers["Strict-Transport-Security"], "max-age=631138519");
    assert_eq!(headers["Content-Security-Policy"], "default-src https:");

    let plaintext = engine
        .resolve_headers(&RequestContext::new(false, None))
        .unwrap();
    assert!(!plaintext.contains_key("Strict-Transport-Security"));
}

#[test]
fn test_append_header() {
    let engine = configured();
    let mut context = secure_request();

    engine
        .append_header(
            &mut context,
            HeaderKind::Csp,
            &json!({ "script_src": ["anothercdn.com"] }),
        )
        .unwrap();

    let headers = engine.resolve_headers(&context).unwrap();
    assert_eq!(
        headers["Content-Security-Policy"],
        "default-src 'self'; script-src mycdn.com 'unsafe-inline' anothercdn.com"
    );
}

#[test]
fn test_append_is_csp_only() {
    let engine = configured();
    let mut context = secure_request();

    let err = engine
        .append_header(&mut context, HeaderKind::Hsts, &json!({ "max_age": 1 }))
        .unwrap_err();
    assert_eq!(err, SecureHeadersError::AppendUnsupported(HeaderKind::Hsts));
    assert!(context.overrides().is_empty());
}

#[test]
fn test_invalid_override_is_rejected_and_not_recorded() {
    let engine = configured();
    let mut context = secure_request();

    assert!(engine
        .override_header_raw(&mut context, HeaderKind::Hsts, &json!("lol"))
        .is_err());
    assert!(engine
        .append_header(&mut context, HeaderKind::Csp, &json!({ "script_src": ["a b"] }))
        .is_err());
    assert!(context.overrides().is_empty());
}

#[test]
fn test_values_with_control_characters_are_rejected() {
    let engine = configured();
    let mut context = secure_request();

    let err = engine
        .override_header(
            &mut context,
            XXssProtection::Report("/r\r\nSet-Cookie: x=1".to_string()),
        )
        .unwrap_err();
    assert!(matches!(err, SecureHeadersError::XXssProtection { .. }));
    assert!(context.overrides().is_empty());

    assert!(engine
        .configure_default(|config| {
            config.csp(json!({ "script_src": ["cdn\u{1}.com"] }));
        })
        .is_err());
    // the earlier default is still in place
    assert_eq!(
        engine.resolve_headers(&context).unwrap()["Content-Security-Policy"],
        "default-src 'self'; script-src mycdn.com 'unsafe-inline'"
    );
}

#[test]
fn test_override_and_opt_out() {
    let engine = configured();
    let mut context = secure_request();

    engine
        .override_header(&mut context, XFrameOptions::Deny)
        .unwrap();
    engine
        .override_header_raw(&mut context, HeaderKind::XDownloadOptions, &json!(false))
        .unwrap();
    engine
        .opt_out_of_header(&mut context, HeaderKind::XXssProtection)
        .unwrap();

    let headers = engine.resolve_headers(&context).unwrap();
    assert_eq!(headers["X-Frame-Options"], "DENY");
    assert!(!headers.contains_key("X-Download-Options"));
    assert!(!headers.contains_key("X-XSS-Protection"));
    assert!(headers.contains_key("X-Content-Type-Options"));
}

#[test]
fn test_opt_out_of_all() {
    let engine = configured();
    let mut context = secure_request();

    engine.opt_out_of_all(&mut context).unwrap();
    assert!(engine.resolve_headers(&context).unwrap().is_empty());

    // later overrides still apply
    engine
        .override_header(&mut context, XFrameOptions::Deny)
        .unwrap();
    let headers = engine.resolve_headers(&context).unwrap();
    assert_eq!(headers.len(), 1);
    assert_eq!(headers["X-Frame-Options"], "DENY");
}

#[test]
fn test_nonce_is_stable_within_a_request() {
    let engine = configured();
    let context = secure_request();

    let first = engine.nonce_for_script(&context);
    let second = engine.nonce_for_script(&context);
    let third = engine.nonce_for_style(&context);
    assert_eq!(first, "n0");
    assert_eq!(first, second);
    assert_eq!(second, third);

    let headers = engine.resolve_headers(&context).unwrap();
    assert_eq!(
        headers["Content-Security-Policy"],
        "default-src 'self'; script-src mycdn.com 'unsafe-inline' 'nonce-n0'"
    );

    let other = secure_request();
    assert_eq!(engine.nonce_for_script(&other), "n1");
}

#[test]
fn test_nonce_is_omitted_for_legacy_clients() {
    let engine = configured();
    let context = RequestContext::new(true, Some(LEGACY_UA.to_string()));

    let nonce = engine.nonce_for_script(&context);
    assert!(!nonce.is_empty());

    let headers = engine.resolve_headers(&context).unwrap();
    assert!(!headers["Content-Security-Policy"].contains("'nonce-"));
}

#[test]
fn test_named_configurations() {
    let engine = configured();
    engine
        .configure_named("strict", |config| {
            config.x_frame_options("DENY");
        })
        .unwrap();
    engine
        .configure_named_from_default("framed", |config| {
            config.x_frame_options(false);
        })
        .unwrap();

    let mut strict = secure_request();
    engine.use_named(&mut strict, "strict").unwrap();
    let headers = engine.resolve_headers(&strict).unwrap();
    assert_eq!(headers["X-Frame-Options"], "DENY");
    // configured from scratch, so CSP falls back to the built-in default
    assert_eq!(headers["Content-Security-Policy"], "default-src https:");

    let mut framed = secure_request();
    engine.use_named(&mut framed, "framed").unwrap();
    let headers = engine.resolve_headers(&framed).unwrap();
    assert!(!headers.contains_key("X-Frame-Options"));
    assert_eq!(
        headers["Content-Security-Policy"],
        "default-src 'self'; script-src mycdn.com 'unsafe-inline'"
    );

    let mut unknown = secure_request();
    assert_eq!(
        engine.use_named(&mut unknown, "missing").unwrap_err(),
        SecureHeadersError::UnknownConfiguration("missing".to_string())
    );
    assert_eq!(unknown.config_name(), None);
}

#[test]
fn test_requests_do_not_share_overrides() {
    let engine = configured();
    let mut first = secure_request();
    let second = secure_request();

    engine
        .opt_out_of_header(&mut first, HeaderKind::Csp)
        .unwrap();

    assert!(!engine
        .resolve_headers(&first)
        .unwrap()
        .contains_key("Content-Security-Policy"));
    assert!(engine
        .resolve_headers(&second)
        .unwrap()
        .contains_key("Content-Security-Policy"));
}

#[test]
fn test_append_csp_directives_typed() {
    let engine = configured();
    let mut context = secure_request();
    let additions = ContentSecurityPolicy::builder()
        .img_src(["data:"])
        .build()
        .unwrap()
        .directives;

    engine
        .append_csp_directives(&mut context, additions)
        .unwrap();
    let headers = engine.resolve_headers(&context).unwrap();
    assert_eq!(
        headers["Content-Security-Policy"],
        "default-src 'self'; script-src mycdn.com 'unsafe-inline'; img-src data:"
    );
}

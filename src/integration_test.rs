#[cfg(test)]
mod integration_tests {
    use crate::headers::{HeaderKind, XFrameOptions};
    use crate::{RequestContext, SecureHeaders, SecureHeadersError};
    use serde_json::json;
    use std::sync::Arc;

    const FIREFOX_UA: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:115.0) Gecko/20100101 Firefox/115.0";

    fn configured_engine() -> Arc<SecureHeaders> {
        let engine = Arc::new(SecureHeaders::new());
        engine
            .configure_default(|config| {
                config
                    .hsts("max-age=31536000")
                    .csp(json!({ "default_src": ["'self'"], "script_src": ["'self'"] }));
            })
            .unwrap();
        engine
            .configure_named_from_default("api", |config| {
                config.csp(json!({ "default_src": ["'none'"] }));
            })
            .unwrap();
        engine
    }

    #[tokio::test]
    async fn test_concurrent_requests_do_not_share_state() {
        let engine = configured_engine();

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    let mut context = RequestContext::new(true, Some(FIREFOX_UA.to_string()));
                    if i % 2 == 0 {
                        engine
                            .opt_out_of_header(&mut context, HeaderKind::XFrameOptions)
                            .unwrap();
                    }
                    if i % 3 == 0 {
                        engine.use_named(&mut context, "api").unwrap();
                    }
                    let nonce = engine.nonce_for_script(&context);
                    tokio::task::yield_now().await;
                    (i, nonce, engine.resolve_headers(&context).unwrap())
                })
            })
            .collect();

        let mut nonces = Vec::new();
        for task in tasks {
            let (i, nonce, headers) = task.await.unwrap();

            assert_eq!(headers.contains_key("X-Frame-Options"), i % 2 != 0, "request {i}");
            let csp = &headers["Content-Security-Policy"];
            if i % 3 == 0 {
                assert_eq!(csp, "default-src 'none'");
            } else {
                assert_eq!(csp, &format!("default-src 'self'; script-src 'self' 'nonce-{nonce}'"));
            }
            nonces.push(nonce);
        }

        nonces.sort();
        nonces.dedup();
        assert_eq!(nonces.len(), 32);
    }

    #[tokio::test]
    async fn test_reconfiguration_applies_to_new_requests() {
        let engine = configured_engine();
        let context = RequestContext::new(true, None);
        assert_eq!(
            engine.resolve_headers(&context).unwrap()["Strict-Transport-Security"],
            "max-age=31536000"
        );

        engine
            .configure_default(|config| {
                config.hsts("max-age=600").value(XFrameOptions::Deny);
            })
            .unwrap();

        let headers = engine.resolve_headers(&context).unwrap();
        assert_eq!(headers["Strict-Transport-Security"], "max-age=600");
        assert_eq!(headers["X-Frame-Options"], "DENY");
        assert_eq!(headers["Content-Security-Policy"], "default-src https:");
    }

    #[test]
    fn test_global_instance() {
        let global = SecureHeaders::global();
        assert!(std::ptr::eq(global, SecureHeaders::global()));

        // other tests never touch the global instance
        let context = RequestContext::new(true, None);
        assert_eq!(
            global.resolve_headers(&context).unwrap_err(),
            SecureHeadersError::NotConfigured
        );
    }
}

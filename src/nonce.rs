//! Per-request CSP nonces.
//!
//! The random source is the only nondeterministic part of header
//! resolution, so it sits behind [`NonceGenerator`].

use std::fmt;
use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;

/// Random bytes per nonce (256 bits).
pub const NONCE_BYTES: usize = 32;

pub trait NonceGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Base64 encoded bytes from the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngNonceGenerator;

impl NonceGenerator for OsRngNonceGenerator {
    fn generate(&self) -> String {
        let mut bytes = [0u8; NONCE_BYTES];
        OsRng.fill_bytes(&mut bytes);
        STANDARD.encode(bytes)
    }
}

/// Memoized nonce for one request. Generated on first use, then fixed for
/// the lifetime of the request.
#[derive(Default)]
pub struct RequestNonce {
    value: OnceLock<String>,
}

impl RequestNonce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_generate(&self, generator: &dyn NonceGenerator) -> &str {
        self.value.get_or_init(|| {
            debug!("Generated CSP nonce for request");
            generator.generate()
        })
    }

    /// The nonce, if one has been requested.
    pub fn get(&self) -> Option<&str> {
        self.value.get().map(String::as_str)
    }
}

impl fmt::Debug for RequestNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestNonce")
            .field("generated", &self.value.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGenerator(AtomicUsize);

    impl NonceGenerator for CountingGenerator {
        fn generate(&self) -> String {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            format!("nonce-{n}")
        }
    }

    #[test]
    fn test_nonce_is_memoized() {
        let generator = CountingGenerator(AtomicUsize::new(0));
        let nonce = RequestNonce::new();

        assert!(nonce.get().is_none());
        let first = nonce.get_or_generate(&generator).to_string();
        let second = nonce.get_or_generate(&generator).to_string();
        let third = nonce.get_or_generate(&generator).to_string();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(generator.0.load(Ordering::SeqCst), 1);
        assert_eq!(nonce.get(), Some(first.as_str()));
    }

    #[test]
    fn test_separate_requests_get_separate_nonces() {
        let generator = CountingGenerator(AtomicUsize::new(0));
        let a = RequestNonce::new();
        let b = RequestNonce::new();

        assert_ne!(a.get_or_generate(&generator), b.get_or_generate(&generator));
    }

    #[test]
    fn test_os_rng_nonce_has_enough_entropy() {
        let nonce = OsRngNonceGenerator.generate();
        let decoded = STANDARD.decode(&nonce).unwrap();

        assert_eq!(decoded.len(), NONCE_BYTES);
        assert_ne!(nonce, OsRngNonceGenerator.generate());
    }
}

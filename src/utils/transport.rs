use axum::http::{header, HeaderMap};

use crate::settings::ServerConfig;

/// Decide whether a request arrived over an encrypted connection
///
/// This server never terminates TLS itself, so the answer comes from
/// configuration or from headers set by a trusted reverse proxy:
///
/// 1. `assume_secure` in the server configuration
/// 2. X-Forwarded-Proto (standard reverse proxy header)
/// 3. Forwarded: proto=https (RFC 7239)
/// 4. X-Forwarded-Ssl: on (older proxies)
///
/// Proxy headers are ignored unless `trust_forwarded_proto` is set, since any
/// client can send them.
pub fn is_secure_request(headers: &HeaderMap, server: &ServerConfig) -> bool {
    if server.assume_secure {
        return true;
    }
    if !server.trust_forwarded_proto {
        return false;
    }

    // X-Forwarded-Proto can list one protocol per hop; the first is the client's
    if let Some(proto) = header_str(headers, "x-forwarded-proto") {
        if let Some(first) = proto.split(',').next() {
            return first.trim().eq_ignore_ascii_case("https");
        }
    }

    if let Some(forwarded) = header_str(headers, "forwarded") {
        let first_hop = forwarded.split(',').next().unwrap_or_default();
        let proto = first_hop.split(';').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("proto")
                .then(|| value.trim().trim_matches('"'))
        });
        if let Some(proto) = proto {
            return proto.eq_ignore_ascii_case("https");
        }
    }

    header_str(headers, "x-forwarded-ssl").is_some_and(|ssl| ssl.trim().eq_ignore_ascii_case("on"))
}

/// The client's User-Agent, if present and valid UTF-8
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    header_str(headers, header::USER_AGENT.as_str()).map(str::to_string)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

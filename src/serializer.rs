//! Renders resolved header values into wire strings.

use crate::headers::HeaderConfig;

/// Render `config` as `(header name, header value)`.
///
/// `nonce` is only honoured by CSP, where it is appended to `script-src` and
/// `style-src`. Callers pass `None` for clients that cannot use nonces.
pub fn serialize(config: &HeaderConfig, nonce: Option<&str>) -> (&'static str, String) {
    let value = match config {
        HeaderConfig::Hsts(hsts) => hsts.header_value(),
        HeaderConfig::Hpkp(hpkp) => hpkp.header_value(),
        HeaderConfig::XFrameOptions(xfo) => xfo.header_value(),
        HeaderConfig::XContentTypeOptions(xcto) => xcto.header_value(),
        HeaderConfig::XXssProtection(xxss) => xxss.header_value(),
        HeaderConfig::XDownloadOptions(xdo) => xdo.header_value(),
        HeaderConfig::XPermittedCrossDomainPolicies(xpcdp) => xpcdp.header_value(),
        HeaderConfig::Csp(csp) => csp.header_value_with_nonce(nonce),
    };
    (config.header_name(), value)
}

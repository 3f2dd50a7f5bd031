//! Content-Security-Policy values.
//!
//! A policy is an ordered [`DirectiveTable`] plus a handful of flags. The
//! per-request nonce is never stored here: it is added while rendering, see
//! [`ContentSecurityPolicy::header_value_with_nonce`].

use tracing::warn;

use crate::errors::{CspConfigError, SecureHeadersError};

mod directive;


pub use directive::{Directive, DirectiveTable};

pub const HEADER_NAME: &str = "Content-Security-Policy";
pub const REPORT_ONLY_HEADER_NAME: &str = "Content-Security-Policy-Report-Only";

const NONE: &str = "'none'";
const STRIPPED_SCHEMES: [&str; 2] = ["https://", "http://"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSecurityPolicy {
    pub directives: DirectiveTable,
    /// Emit as `Content-Security-Policy-Report-Only`.
    pub report_only: bool,
    /// Keep `http://`/`https://` prefixes on host sources.
    pub preserve_schemes: bool,
    pub block_all_mixed_content: bool,
    pub upgrade_insecure_requests: bool,
}

/// `default-src https:`
impl Default for ContentSecurityPolicy {
    fn default() -> Self {
        Self::from_directives(DirectiveTable::single(Directive::DefaultSrc, "https:"))
    }
}

impl ContentSecurityPolicy {
    pub fn builder() -> CspBuilder {
        CspBuilder::default()
    }

    pub fn from_directives(directives: DirectiveTable) -> Self {
        Self {
            directives,
            report_only: false,
            preserve_schemes: false,
            block_all_mixed_content: false,
            upgrade_insecure_requests: false,
        }
    }

    pub fn validate(&self) -> Result<(), SecureHeadersError> {
        if self.directives.is_empty()
            && !self.block_all_mixed_content
            && !self.upgrade_insecure_requests
        {
            return Err(CspConfigError::InvalidValue {
                key: "directives".to_string(),
                value: "{}".to_string(),
            }
            .into());
        }

        let script_sources = self
            .directives
            .get(Directive::ScriptSrc)
            .or_else(|| self.directives.get(Directive::DefaultSrc));
        if script_sources.is_some_and(|tokens| tokens.iter().any(|t| t == "'unsafe-inline'")) {
            warn!("⚠️  CSP allows 'unsafe-inline' scripts; prefer nonces");
        }
        if self.report_only && !self.directives.contains(Directive::ReportUri) {
            warn!("⚠️  CSP is report-only but no report-uri is configured");
        }
        Ok(())
    }

    pub fn header_name(&self) -> &'static str {
        if self.report_only {
            REPORT_ONLY_HEADER_NAME
        } else {
            HEADER_NAME
        }
    }

    pub fn header_value(&self) -> String {
        self.header_value_with_nonce(None)
    }

    /// Render the policy, adding `'nonce-<value>'` to `script-src` and
    /// `style-src` when a nonce is given. The stored table is untouched.
    pub fn header_value_with_nonce(&self, nonce: Option<&str>) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.directives.len() + 2);

        for (directive, tokens) in self.directives.iter() {
            let mut rendered: Vec<String> = tokens
                .iter()
                .map(|token| self.render_token(directive, token))
                .collect();

            if let Some(nonce) = nonce {
                let only_none = rendered.len() == 1 && rendered[0] == NONE;
                if directive.accepts_nonce() && !only_none {
                    let token = format!("'nonce-{nonce}'");
                    if !rendered.contains(&token) {
                        rendered.push(token);
                    }
                }
            }

            if rendered.len() > 1 {
                rendered.retain(|token| token != NONE);
            }

            if rendered.is_empty() {
                parts.push(directive.as_str().to_string());
            } else {
                parts.push(format!("{} {}", directive.as_str(), rendered.join(" ")));
            }
        }

        if self.block_all_mixed_content {
            parts.push("block-all-mixed-content".to_string());
        }
        if self.upgrade_insecure_requests {
            parts.push("upgrade-insecure-requests".to_string());
        }

        parts.join("; ")
    }

    fn render_token(&self, directive: Directive, token: &str) -> String {
        if self.preserve_schemes || !directive.takes_sources() {
            return token.to_string();
        }
        STRIPPED_SCHEMES
            .iter()
            .find_map(|scheme| token.strip_prefix(scheme))
            .filter(|host| !host.is_empty())
            .unwrap_or(token)
            .to_string()
    }
}

/// Collects directives and flags, validating everything in [`CspBuilder::build`].
#[derive(Debug, Default)]
pub struct CspBuilder {
    directives: Vec<(String, Vec<String>)>,
    report_only: bool,
    preserve_schemes: bool,
    block_all_mixed_content: bool,
    upgrade_insecure_requests: bool,
}

impl CspBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directive<I, S>(mut self, name: impl Into<String>, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.directives.push((
            name.into(),
            sources.into_iter().map(|s| s.as_ref().to_string()).collect(),
        ));
        self
    }

    pub fn default_src<I: IntoIterator<Item = S>, S: AsRef<str>>(self, sources: I) -> Self {
        self.directive(Directive::DefaultSrc.as_str(), sources)
    }

    pub fn script_src<I: IntoIterator<Item = S>, S: AsRef<str>>(self, sources: I) -> Self {
        self.directive(Directive::ScriptSrc.as_str(), sources)
    }

    pub fn style_src<I: IntoIterator<Item = S>, S: AsRef<str>>(self, sources: I) -> Self {
        self.directive(Directive::StyleSrc.as_str(), sources)
    }

    pub fn img_src<I: IntoIterator<Item = S>, S: AsRef<str>>(self, sources: I) -> Self {
        self.directive(Directive::ImgSrc.as_str(), sources)
    }

    pub fn connect_src<I: IntoIterator<Item = S>, S: AsRef<str>>(self, sources: I) -> Self {
        self.directive(Directive::ConnectSrc.as_str(), sources)
    }

    pub fn object_src<I: IntoIterator<Item = S>, S: AsRef<str>>(self, sources: I) -> Self {
        self.directive(Directive::ObjectSrc.as_str(), sources)
    }

    pub fn frame_ancestors<I: IntoIterator<Item = S>, S: AsRef<str>>(self, sources: I) -> Self {
        self.directive(Directive::FrameAncestors.as_str(), sources)
    }

    pub fn report_uri<I: IntoIterator<Item = S>, S: AsRef<str>>(self, uris: I) -> Self {
        self.directive(Directive::ReportUri.as_str(), uris)
    }

    pub fn report_only(mut self, enabled: bool) -> Self {
        self.report_only = enabled;
        self
    }

    pub fn preserve_schemes(mut self, enabled: bool) -> Self {
        self.preserve_schemes = enabled;
        self
    }

    pub fn block_all_mixed_content(mut self, enabled: bool) -> Self {
        self.block_all_mixed_content = enabled;
        self
    }

    pub fn upgrade_insecure_requests(mut self, enabled: bool) -> Self {
        self.upgrade_insecure_requests = enabled;
        self
    }

    pub fn build(self) -> Result<ContentSecurityPolicy, SecureHeadersError> {
        let directives = DirectiveTable::from_pairs(self.directives)?;
        let policy = ContentSecurityPolicy {
            directives,
            report_only: self.report_only,
            preserve_schemes: self.preserve_schemes,
            block_all_mixed_content: self.block_all_mixed_content,
            upgrade_insecure_requests: self.upgrade_insecure_requests,
        };
        policy.validate()?;
        Ok(policy)
    }
}

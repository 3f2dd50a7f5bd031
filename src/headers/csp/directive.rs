use std::fmt;
use std::str::FromStr;

use crate::errors::CspConfigError;

/// Source keywords that must be single-quoted on the wire.
const KEYWORDS: [&str; 7] = [
    "self",
    "none",
    "unsafe-inline",
    "unsafe-eval",
    "strict-dynamic",
    "unsafe-hashes",
    "report-sample",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    DefaultSrc,
    BaseUri,
    ChildSrc,
    ConnectSrc,
    FontSrc,
    FormAction,
    FrameAncestors,
    FrameSrc,
    ImgSrc,
    ManifestSrc,
    MediaSrc,
    ObjectSrc,
    PluginTypes,
    ReportUri,
    Sandbox,
    ScriptSrc,
    StyleSrc,
    WorkerSrc,
}

impl Directive {
    pub const ALL: [Directive; 18] = [
        Directive::DefaultSrc,
        Directive::BaseUri,
        Directive::ChildSrc,
        Directive::ConnectSrc,
        Directive::FontSrc,
        Directive::FormAction,
        Directive::FrameAncestors,
        Directive::FrameSrc,
        Directive::ImgSrc,
        Directive::ManifestSrc,
        Directive::MediaSrc,
        Directive::ObjectSrc,
        Directive::PluginTypes,
        Directive::ReportUri,
        Directive::Sandbox,
        Directive::ScriptSrc,
        Directive::StyleSrc,
        Directive::WorkerSrc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Directive::DefaultSrc => "default-src",
            Directive::BaseUri => "base-uri",
            Directive::ChildSrc => "child-src",
            Directive::ConnectSrc => "connect-src",
            Directive::FontSrc => "font-src",
            Directive::FormAction => "form-action",
            Directive::FrameAncestors => "frame-ancestors",
            Directive::FrameSrc => "frame-src",
            Directive::ImgSrc => "img-src",
            Directive::ManifestSrc => "manifest-src",
            Directive::MediaSrc => "media-src",
            Directive::ObjectSrc => "object-src",
            Directive::PluginTypes => "plugin-types",
            Directive::ReportUri => "report-uri",
            Directive::Sandbox => "sandbox",
            Directive::ScriptSrc => "script-src",
            Directive::StyleSrc => "style-src",
            Directive::WorkerSrc => "worker-src",
        }
    }

    /// Whether the directive takes a source list (hosts, schemes, keywords).
    pub fn takes_sources(self) -> bool {
        !matches!(
            self,
            Directive::PluginTypes | Directive::ReportUri | Directive::Sandbox
        )
    }

    /// Directives that receive the per-request nonce.
    pub fn accepts_nonce(self) -> bool {
        matches!(self, Directive::ScriptSrc | Directive::StyleSrc)
    }

    /// Validate one raw token and bring it into wire form.
    pub fn normalize_token(self, raw: &str) -> Result<String, CspConfigError> {
        let invalid = || CspConfigError::InvalidSource {
            directive: self.as_str().to_string(),
            value: raw.to_string(),
        };
        let token = raw.trim();

        if token.is_empty()
            || token
                .chars()
                .any(|c| c.is_whitespace() || c.is_ascii_control() || c == ';' || c == ',')
        {
            return Err(invalid());
        }

        match self {
            Directive::Sandbox => {
                if !token.starts_with("allow-") {
                    return Err(invalid());
                }
                Ok(token.to_string())
            }
            Directive::PluginTypes => {
                if !token.contains('/') {
                    return Err(invalid());
                }
                Ok(token.to_string())
            }
            Directive::ReportUri => Ok(token.to_string()),
            _ => {
                if token.starts_with('\'') {
                    if token.len() < 3 || !token.ends_with('\'') {
                        return Err(invalid());
                    }
                    return Ok(token.to_string());
                }
                let lowered = token.to_ascii_lowercase();
                if KEYWORDS.contains(&lowered.as_str()) {
                    return Ok(format!("'{lowered}'"));
                }
                Ok(token.to_string())
            }
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Directive {
    type Err = CspConfigError;

    /// Accepts both `script-src` and `script_src`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Directive::ALL
            .into_iter()
            .find(|directive| directive.as_str() == normalized)
            .ok_or_else(|| CspConfigError::UnknownDirective(s.to_string()))
    }
}

/// Directives in insertion order, each with an ordered, de-duplicated token
/// list. Tokens are normalized on the way in, so the table always holds
/// wire-ready values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveTable {
    entries: Vec<(Directive, Vec<String>)>,
}

impl DirectiveTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, tokens)` pairs, e.g. parsed configuration.
    pub fn from_pairs<I, N, T, S>(pairs: I) -> Result<Self, CspConfigError>
    where
        I: IntoIterator<Item = (N, T)>,
        N: AsRef<str>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = DirectiveTable::new();
        for (name, tokens) in pairs {
            let directive: Directive = name.as_ref().parse()?;
            table.insert(directive, tokens)?;
        }
        Ok(table)
    }

    pub(crate) fn single(directive: Directive, token: &str) -> Self {
        Self {
            entries: vec![(directive, vec![token.to_string()])],
        }
    }

    pub fn get(&self, directive: Directive) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(d, _)| *d == directive)
            .map(|(_, tokens)| tokens.as_slice())
    }

    pub fn contains(&self, directive: Directive) -> bool {
        self.get(directive).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Directive, &[String])> {
        self.entries
            .iter()
            .map(|(directive, tokens)| (*directive, tokens.as_slice()))
    }

    /// Replace a directive's tokens, keeping its position if already present.
    pub fn insert<I, S>(&mut self, directive: Directive, tokens: I) -> Result<(), CspConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized = normalize_all(directive, tokens)?;
        ensure_not_empty(directive, &normalized)?;
        match self.entries.iter_mut().find(|(d, _)| *d == directive) {
            Some((_, existing)) => *existing = normalized,
            None => self.entries.push((directive, normalized)),
        }
        Ok(())
    }

    /// Add tokens after the existing ones, skipping duplicates. Creates the
    /// directive at the end of the table if it is not present yet.
    pub fn append<I, S>(&mut self, directive: Directive, tokens: I) -> Result<(), CspConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized = normalize_all(directive, tokens)?;
        match self.entries.iter_mut().find(|(d, _)| *d == directive) {
            Some((_, existing)) => {
                for token in normalized {
                    if !existing.contains(&token) {
                        existing.push(token);
                    }
                }
            }
            None => {
                ensure_not_empty(directive, &normalized)?;
                self.entries.push((directive, normalized));
            }
        }
        Ok(())
    }

    /// Append every directive of `other`, in `other`'s order.
    pub fn merge(&mut self, other: &DirectiveTable) {
        for (directive, tokens) in &other.entries {
            match self.entries.iter_mut().find(|(d, _)| d == directive) {
                Some((_, existing)) => {
                    for token in tokens {
                        if !existing.contains(token) {
                            existing.push(token.clone());
                        }
                    }
                }
                None => self.entries.push((*directive, tokens.clone())),
            }
        }
    }
}

fn normalize_all<I, S>(directive: Directive, tokens: I) -> Result<Vec<String>, CspConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for token in tokens {
        let token = directive.normalize_token(token.as_ref())?;
        if !normalized.contains(&token) {
            normalized.push(token);
        }
    }
    Ok(normalized)
}

fn ensure_not_empty(directive: Directive, tokens: &[String]) -> Result<(), CspConfigError> {
    // A bare `sandbox` applies every restriction; other directives need a source
    if tokens.is_empty() && directive != Directive::Sandbox {
        return Err(CspConfigError::InvalidValue {
            key: directive.as_str().to_string(),
            value: "[]".to_string(),
        });
    }
    Ok(())
}

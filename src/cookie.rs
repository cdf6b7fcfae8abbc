use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::RewriteError;
use crate::url_rewriter::UrlRewriter;

pub const SET_COOKIE: &str = "Set-Cookie";

static COOKIE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+\-.^_`|~:]+$").unwrap()
});

static COOKIE_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:"(?:[^\\"]|\\.)*"|[\w!#%&'~`><@,:/$*+\-.^|)(?}{=]*)$"#).unwrap()
});

/// Attribute keywords recognised inside a `Set-Cookie` value. Any other
/// `key=value` token starts a new cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute {
    Path,
    Domain,
    Expires,
    MaxAge,
    Secure,
    HttpOnly,
}

impl Attribute {
    fn lookup(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "path" => Some(Attribute::Path),
            "domain" => Some(Attribute::Domain),
            "expires" => Some(Attribute::Expires),
            "max-age" => Some(Attribute::MaxAge),
            "secure" => Some(Attribute::Secure),
            "httponly" => Some(Attribute::HttpOnly),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Attribute::Path => "Path",
            Attribute::Domain => "Domain",
            Attribute::Expires => "Expires",
            Attribute::MaxAge => "Max-Age",
            Attribute::Secure => "Secure",
            Attribute::HttpOnly => "HttpOnly",
        }
    }

    fn is_flag(self) -> bool {
        matches!(self, Attribute::Secure | Attribute::HttpOnly)
    }
}

/// One cookie from a `Set-Cookie` header, attributes in their original order
/// under canonical names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieEntry {
    pub name: String,
    pub value: String,
    pub attributes: Vec<(String, String)>,
}

impl CookieEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attributes: Vec::new(),
        }
    }

    /// Splits a header value into cookies.
    ///
    /// A header may carry several cookies: every `;`-separated token that is
    /// not an attribute keyword starts a new one. Cookies whose `name=value`
    /// is malformed are dropped together with their attributes.
    pub fn parse_header(header: &str) -> Vec<CookieEntry> {
        let mut cookies = Vec::new();
        let mut current: Option<CookieEntry> = None;

        for token in header.split(';').map(str::trim).filter(|t| !t.is_empty()) {
            let (key, value) = match token.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (token, None),
            };

            if let Some(attr) = Attribute::lookup(key) {
                if let Some(cookie) = current.as_mut() {
                    match (attr.is_flag(), value) {
                        (true, _) => cookie.attributes.push((attr.name().to_string(), String::new())),
                        (false, Some(value)) => cookie
                            .attributes
                            .push((attr.name().to_string(), value.to_string())),
                        (false, None) => debug!("Ignoring cookie attribute {:?} without a value", key),
                    }
                }
                continue;
            }

            if let Some(done) = current.take() {
                cookies.push(done);
            }

            current = match value {
                Some(value) if COOKIE_NAME.is_match(key) && COOKIE_VALUE.is_match(value) => {
                    Some(CookieEntry::new(key, value))
                }
                _ => {
                    debug!("Dropping malformed cookie {:?}", token);
                    None
                }
            };
        }

        if let Some(done) = current {
            cookies.push(done);
        }
        cookies
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn has(&self, attr: Attribute) -> bool {
        self.attributes.iter().any(|(n, _)| n == attr.name())
    }

    fn remove(&mut self, attr: Attribute) {
        self.attributes.retain(|(n, _)| n != attr.name());
    }

    /// Sets `Path`, keeping the position of an existing one.
    fn set_path(&mut self, path: String) {
        let name = Attribute::Path.name();
        let first = self.attributes.iter().position(|(n, _)| n == name);
        self.remove(Attribute::Path);
        let at = first.unwrap_or(self.attributes.len());
        self.attributes.insert(at, (name.to_string(), path));
    }
}

impl fmt::Display for CookieEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        for (name, value) in &self.attributes {
            match Attribute::lookup(name) {
                Some(attr) if attr.is_flag() => write!(f, "; {}", name)?,
                _ => write!(f, "; {}={}", name, value)?,
            }
        }
        Ok(())
    }
}

/// Where cookies without `Domain` or `Path` end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CookieScope {
    /// Leave them alone; the browser scopes them to the current replay page.
    #[default]
    Minimal,
    /// Give them an explicit `Path` equal to the per-page replay prefix.
    ReplayPath,
}

impl FromStr for CookieScope {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" => Ok(CookieScope::Minimal),
            "replay-path" | "replay_path" => Ok(CookieScope::ReplayPath),
            _ => Err(RewriteError::UnknownCookieScope(s.to_string())),
        }
    }
}

/// Re-scopes `Set-Cookie` values to the replay path space.
#[derive(Debug, Clone, Copy)]
pub struct CookieRewriter<'a> {
    url_rewriter: &'a UrlRewriter,
    scope: CookieScope,
}

impl<'a> CookieRewriter<'a> {
    pub fn new(url_rewriter: &'a UrlRewriter) -> Self {
        Self::with_scope(url_rewriter, CookieScope::default())
    }

    pub fn with_scope(url_rewriter: &'a UrlRewriter, scope: CookieScope) -> Self {
        Self { url_rewriter, scope }
    }

    /// Rewrites a `Set-Cookie` value into zero or more `Set-Cookie` headers.
    pub fn rewrite(&self, header_value: &str) -> Vec<(String, String)> {
        self.rewrite_header(header_value, SET_COOKIE)
    }

    /// As [`CookieRewriter::rewrite`], emitting `header_name` for each cookie.
    pub fn rewrite_header(&self, header_value: &str, header_name: &str) -> Vec<(String, String)> {
        CookieEntry::parse_header(header_value)
            .into_iter()
            .map(|cookie| (header_name.to_string(), self.rewrite_cookie(cookie).to_string()))
            .collect()
    }

    /// Applies the scoping policy to a single cookie.
    ///
    /// `Expires` and `Max-Age` describe capture time and are always removed.
    /// A domain cookie loses its `Domain` and is widened to the site root, since
    /// it would otherwise be tied to one capture's timestamp and path. A cookie
    /// with a `Path` gets that path resolved against the current page and
    /// re-prefixed.
    pub fn rewrite_cookie(&self, mut cookie: CookieEntry) -> CookieEntry {
        let has_domain = cookie.has(Attribute::Domain);
        let path = cookie.attribute(Attribute::Path.name()).map(str::to_string);

        cookie.remove(Attribute::Domain);
        cookie.remove(Attribute::Expires);
        cookie.remove(Attribute::MaxAge);

        let new_path = if has_domain {
            Some(self.url_rewriter.root_prefix().to_string())
        } else if let Some(path) = path {
            Some(self.url_rewriter.rewrite(&path))
        } else if self.scope == CookieScope::ReplayPath {
            Some(self.url_rewriter.replay_prefix())
        } else {
            None
        };

        if let Some(new_path) = new_path {
            cookie.set_path(new_path);
        }
        cookie
    }
}

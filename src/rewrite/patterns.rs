use once_cell::sync::Lazy;
use regex::Regex;

/// An absolute http(s) URL up to the end of its host, slashes optionally
/// backslash-escaped.
pub const HTTPX_MATCH_STR: &str = r"https?:\\?/\\?/[A-Za-z0-9:_@.-]+";

// Script

/// Absolute or protocol-relative URL opening a quoted literal, at any escape depth.
pub static JS_QUOTED_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"["']((?:https?:)?\\{0,4}/\\{0,4}/[A-Za-z0-9:_@%.-]+)"#).unwrap()
});

/// Absolute URL after `;`, as in entity-quoted script (`&quot;http:\/\/...`).
pub static JS_ENTITY_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r";(https?:\\{0,4}/\\{0,4}/[A-Za-z0-9:_@%.-]+)").unwrap()
});

pub static JS_LOCATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"location\b").unwrap());

pub static JS_DOCUMENT_PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"document\.(domain|cookie)\b").unwrap()
});

// Markup

/// Optional `attr=` lead-in (any XML name, so `xmlns:ns1` and `xmlns:dc-terms`
/// are captured whole), optional quote/space, then the URL (group 2).
pub static XML_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#"([A-Za-z_][\w.:-]*[\s=]+)?["'\s]*({})"#, HTTPX_MATCH_STR)).unwrap()
});

// Style

pub static CSS_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"url\s*\(\s*[\\"']*([^)'"]+)[\\"']*\s*\)"#).unwrap()
});

/// `@import` without `url(`: bare, quoted, or behind a lone parenthesis.
pub static CSS_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@import\s+\(?\s*['"]?([\w.:/\\-]+)"#).unwrap()
});

pub static HTTPX: Lazy<Regex> = Lazy::new(|| Regex::new(HTTPX_MATCH_STR).unwrap());

//! Rule-based rewriting of script, style and markup content.
//!
//! A [`RegexRewriter`] is an ordered list of [`Rule`]s. Each rule makes a single
//! left-to-right pass over the output of the previous one, so text produced by a
//! rule is never rescanned by the rules before it. The built-in tables for each
//! [`ContentKind`] come first; caller-supplied rules are appended after them.

mod patterns;
mod rule;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::RewriteError;
use crate::url_rewriter::UrlRewriter;

pub use patterns::HTTPX_MATCH_STR;
pub use rule::{Boundary, Filter, Rule, Transform};

/// Prefix that redirects script-visible globals to the client-side replay shim.
pub const DEFAULT_SENTINEL: &str = "WB_wombat_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Script,
    Style,
    Markup,
}

impl ContentKind {
    /// Picks the rewriter for a `Content-Type` value, ignoring parameters.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "text/javascript" | "application/javascript" | "application/x-javascript"
            | "application/ecmascript" | "text/ecmascript" => Some(ContentKind::Script),
            "text/css" => Some(ContentKind::Style),
            "text/xml" | "application/xml" | "text/html" | "application/xhtml+xml"
            | "application/rss+xml" | "application/atom+xml" => Some(ContentKind::Markup),
            _ => None,
        }
    }
}

impl FromStr for ContentKind {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "js" | "javascript" | "script" => Ok(ContentKind::Script),
            "css" | "style" => Ok(ContentKind::Style),
            "xml" | "html" | "markup" => Ok(ContentKind::Markup),
            _ => Err(RewriteError::UnknownContentKind(s.to_string())),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Script => write!(f, "js"),
            ContentKind::Style => write!(f, "css"),
            ContentKind::Markup => write!(f, "xml"),
        }
    }
}

/// Immutable, ordered rule list. Safe to share across threads and requests;
/// the per-request context is passed to [`RegexRewriter::rewrite`].
#[derive(Debug, Clone)]
pub struct RegexRewriter {
    rules: Vec<Rule>,
}

impl RegexRewriter {
    /// Rewriter made only of the given rules.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Built-in rules for `kind`, followed by `extra_rules`.
    pub fn for_kind(kind: ContentKind, extra_rules: Vec<Rule>) -> Self {
        match kind {
            ContentKind::Script => Self::script(extra_rules),
            ContentKind::Style => Self::style(extra_rules),
            ContentKind::Markup => Self::markup(extra_rules),
        }
    }

    pub fn script(extra_rules: Vec<Rule>) -> Self {
        Self::script_with_sentinel(DEFAULT_SENTINEL, extra_rules)
    }

    /// Script rewriter using a custom sentinel prefix for `location`,
    /// `document.domain` and `document.cookie`.
    pub fn script_with_sentinel(sentinel: &str, extra_rules: Vec<Rule>) -> Self {
        let builtin = vec![
            Rule::from_regex(patterns::JS_QUOTED_URL.clone(), Transform::ReplayPrefix)
                .on_group(1)
                .with_boundary(Boundary::Any),
            Rule::from_regex(patterns::JS_ENTITY_URL.clone(), Transform::ReplayPrefix)
                .on_group(1)
                .with_boundary(Boundary::Any),
            Rule::from_regex(
                patterns::JS_LOCATION.clone(),
                Transform::AddPrefix(sentinel.to_string()),
            )
            .with_boundary(Boundary::NonWordOrSlash),
            Rule::from_regex(
                patterns::JS_DOCUMENT_PROPERTY.clone(),
                Transform::AddPrefix(sentinel.to_string()),
            )
            .on_group(1),
        ];
        Self::with_extras(builtin, extra_rules)
    }

    pub fn style(extra_rules: Vec<Rule>) -> Self {
        let builtin = vec![
            Rule::from_regex(patterns::CSS_URL.clone(), Transform::ArchivalRewrite).on_group(1),
            Rule::from_regex(patterns::CSS_IMPORT.clone(), Transform::ArchivalRewrite)
                .on_group(1)
                .with_filter(Filter::UrlFunction { group: 1 }),
        ];
        Self::with_extras(builtin, extra_rules)
    }

    pub fn markup(extra_rules: Vec<Rule>) -> Self {
        let builtin = vec![Rule::from_regex(patterns::XML_URL.clone(), Transform::ReplayPrefix)
            .on_group(2)
            .with_filter(Filter::GroupStartsWith {
                group: 1,
                prefix: "xmlns".to_string(),
            })];
        Self::with_extras(builtin, extra_rules)
    }

    fn with_extras(mut builtin: Vec<Rule>, extra_rules: Vec<Rule>) -> Self {
        if !extra_rules.is_empty() {
            debug!("Appending {} caller rule(s) after {} built-in rule(s)", extra_rules.len(), builtin.len());
        }
        builtin.extend(extra_rules);
        Self { rules: builtin }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Runs every rule once, in order, each over the previous rule's output.
    ///
    /// Never fails: content the rules do not recognize is passed through.
    pub fn rewrite(&self, content: &str, url_rewriter: &UrlRewriter) -> String {
        self.rules
            .iter()
            .fold(content.to_string(), |buffer, rule| rule.apply(&buffer, url_rewriter))
    }
}

use regex::{Captures, Regex};
use tracing::trace;

use super::patterns::HTTPX;
use crate::error::RewriteError;
use crate::url_rewriter::UrlRewriter;

/// What a rule does with the text it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Prepend a literal string.
    AddPrefix(String),
    /// Demote a leading `https` to `http`.
    RemoveHttps,
    /// Render the match into a template; `{0}` stands for the matched text.
    Format(String),
    /// Insert the per-page replay prefix, adding `http:` when the match has no scheme.
    /// The match itself, escapes included, is kept verbatim.
    ReplayPrefix,
    /// Resolve the match as a link with [`UrlRewriter::rewrite`].
    ArchivalRewrite,
}

impl Transform {
    pub fn apply(&self, matched: &str, url_rewriter: &UrlRewriter) -> String {
        match self {
            Transform::AddPrefix(prefix) => format!("{}{}", prefix, matched),
            Transform::RemoveHttps => match matched.strip_prefix("https") {
                Some(rest) => format!("http{}", rest),
                None => matched.to_string(),
            },
            Transform::Format(template) => template.replace("{0}", matched),
            Transform::ReplayPrefix => {
                let scheme = if matched.starts_with("http") { "" } else { "http:" };
                format!("{}{}{}", url_rewriter.replay_prefix(), scheme, matched)
            }
            Transform::ArchivalRewrite => {
                let link = matched.trim_end();
                if link.is_empty() {
                    return matched.to_string();
                }
                format!("{}{}", url_rewriter.rewrite(link), &matched[link.len()..])
            }
        }
    }
}

/// Condition on the character right before a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Any,
    /// Start of input or a non-identifier character.
    NonWord,
    /// As [`Boundary::NonWord`], and also not `/`.
    NonWordOrSlash,
}

impl Boundary {
    fn allows(self, prev: Option<char>) -> bool {
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        match (self, prev) {
            (Boundary::Any, _) | (_, None) => true,
            (Boundary::NonWord, Some(c)) => !is_word(c),
            (Boundary::NonWordOrSlash, Some(c)) => !is_word(c) && c != '/',
        }
    }
}

/// Keeps a whole match unchanged when it turns out not to be a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    None,
    /// The given group starts with `prefix` (e.g. an `xmlns` attribute name).
    GroupStartsWith { group: usize, prefix: String },
    /// The given group is the name of a `url(` function rather than a path.
    UrlFunction { group: usize },
}

impl Filter {
    fn keeps(&self, caps: &Captures<'_>, haystack: &str) -> bool {
        match self {
            Filter::None => false,
            Filter::GroupStartsWith { group, prefix } => caps
                .get(*group)
                .map_or(false, |m| m.as_str().starts_with(prefix.as_str())),
            Filter::UrlFunction { group } => caps.get(*group).map_or(false, |m| {
                let next = haystack[m.end()..].chars().next();
                m.as_str().eq_ignore_ascii_case("url")
                    && next.map_or(true, |c| c.is_whitespace() || c == '(')
            }),
        }
    }
}

/// One substitution pass: a pattern, the transform applied to one of its
/// groups, and the guards deciding whether a match counts.
///
/// Text of the match outside the transformed group is copied through
/// unchanged, so a rule can anchor on surrounding context without rewriting it.
#[derive(Debug, Clone)]
pub struct Rule {
    regex: Regex,
    transform: Transform,
    group: usize,
    boundary: Boundary,
    filter: Filter,
}

impl Rule {
    /// Compiles a rule that transforms the whole match.
    ///
    /// Like the built-in rules, it only matches at a non-identifier boundary.
    pub fn new(pattern: &str, transform: Transform) -> Result<Self, RewriteError> {
        let regex = Regex::new(pattern).map_err(|source| RewriteError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self::from_regex(regex, transform))
    }

    pub(crate) fn from_regex(regex: Regex, transform: Transform) -> Self {
        Self {
            regex,
            transform,
            group: 0,
            boundary: Boundary::NonWord,
            filter: Filter::None,
        }
    }

    /// Rule rendering every match into `template` (`{0}` is the match).
    pub fn format(pattern: &str, template: &str) -> Result<Self, RewriteError> {
        Self::new(pattern, Transform::Format(template.to_string()))
    }

    /// Rule demoting every absolute `https://` URL to `http://`.
    ///
    /// Only URLs at a non-identifier boundary count: `xhttps://host` is left as is.
    pub fn remove_https() -> Self {
        Self::from_regex(HTTPX.clone(), Transform::RemoveHttps)
    }

    pub fn on_group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Applies the rule once, left to right, over `input`.
    pub fn apply(&self, input: &str, url_rewriter: &UrlRewriter) -> String {
        let mut out = String::with_capacity(input.len());
        let mut copied = 0;
        let mut pos = 0;
        let mut hits = 0;

        while pos <= input.len() {
            let Some(caps) = self.regex.captures_at(input, pos) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            let resume = if whole.end() > whole.start() {
                whole.end()
            } else {
                next_char(input, whole.start())
            };

            if !self.boundary.allows(input[..whole.start()].chars().next_back()) {
                pos = next_char(input, whole.start());
                continue;
            }

            if !self.filter.keeps(&caps, input) {
                if let Some(target) = caps.get(self.group) {
                    out.push_str(&input[copied..target.start()]);
                    out.push_str(&self.transform.apply(target.as_str(), url_rewriter));
                    copied = target.end();
                    hits += 1;
                }
            }
            pos = resume;
        }

        out.push_str(&input[copied..]);
        if hits > 0 {
            trace!("Rule {:?} rewrote {} match(es)", self.regex.as_str(), hits);
        }
        out
    }
}

fn next_char(input: &str, at: usize) -> usize {
    at + input[at..].chars().next().map_or(1, char::len_utf8)
}

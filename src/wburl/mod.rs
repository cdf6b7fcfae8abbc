mod parser;
mod patterns;
#[cfg(test)]
mod tests;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::capture::CaptureRecord;
use crate::error::WbUrlError;

/// Identity modifier: serve the capture unmodified, never an embed.
pub const IDENTITY_MODIFIER: &str = "id_";

/// What a replay request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// A capture at (or closest to) a given timestamp.
    Replay,
    /// The most recent capture; no timestamp was given.
    LatestReplay,
    /// A listing of captures for an exact URL.
    Query,
    /// A listing of captures for every URL under a prefix (trailing `*`).
    UrlQuery,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Replay => write!(f, "replay"),
            Mode::LatestReplay => write!(f, "latest_replay"),
            Mode::Query => write!(f, "query"),
            Mode::UrlQuery => write!(f, "url_query"),
        }
    }
}

/// Parsed replay path: `[modifier/][timestamp][-end]['*']/<url>`.
///
/// Values are immutable once parsed. The [`Display`](fmt::Display) form is the
/// canonical string: it re-parses to an equal value but is not guaranteed to be
/// byte-identical to the raw input, since slashes and encoded scheme separators
/// are normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WbUrl {
    mode: Mode,
    timestamp: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    end_timestamp: String,
    modifier: String,
    url: String,
}

impl WbUrl {
    /// Parses a raw replay path.
    ///
    /// Fails only when the input is empty or carries no target at all; every
    /// other oddity (missing scheme, single slash after the scheme, encoded
    /// `%3A%2F%2F`) is normalized.
    pub fn parse(raw: &str) -> Result<Self, WbUrlError> {
        parser::parse(raw)
    }

    /// Replay value for a capture selected by the index, at its exact timestamp.
    pub fn from_capture(record: &CaptureRecord, modifier: &str) -> Result<Self, WbUrlError> {
        let url = parser::normalize_target(&record.original)
            .ok_or_else(|| WbUrlError::InvalidUrl(record.original.clone()))?;
        Ok(Self {
            mode: Mode::Replay,
            timestamp: record.timestamp.clone(),
            end_timestamp: String::new(),
            modifier: modifier.to_string(),
            url,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Upper bound of a `from-to*` range query. Kept only for the canonical form.
    pub fn end_timestamp(&self) -> &str {
        &self.end_timestamp
    }

    pub fn modifier(&self) -> &str {
        &self.modifier
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_replay(&self) -> bool {
        matches!(self.mode, Mode::Replay | Mode::LatestReplay)
    }

    pub fn is_latest_replay(&self) -> bool {
        self.mode == Mode::LatestReplay
    }

    pub fn is_query(&self) -> bool {
        matches!(self.mode, Mode::Query | Mode::UrlQuery)
    }

    pub fn is_url_query(&self) -> bool {
        self.mode == Mode::UrlQuery
    }

    /// True for modifiers that denote an embedded resource (`im_`, `cs_`, `js_`...).
    pub fn is_embed(&self) -> bool {
        !self.modifier.is_empty()
            && self.modifier != IDENTITY_MODIFIER
            && self.modifier.ends_with('_')
    }

    /// True when the target is a scheme with no host or path (`http://`).
    pub fn is_blank(&self) -> bool {
        self.url
            .split_once("://")
            .map_or(false, |(_, rest)| rest.is_empty())
    }

    /// Copy of this value pinned to `timestamp`, switching to [`Mode::Replay`].
    pub fn with_replay_timestamp(&self, timestamp: &str) -> Self {
        Self {
            mode: Mode::Replay,
            timestamp: timestamp.to_string(),
            end_timestamp: String::new(),
            ..self.clone()
        }
    }

    /// Renders `url` in replay form using this value's timestamp.
    ///
    /// Produces `<timestamp><modifier>/<url>`, or just `<url>` when both the
    /// timestamp and the modifier are empty. Query values render in replay form
    /// too, since rewritten links always point at captures.
    pub fn render_replay(&self, modifier: &str, url: &str) -> String {
        let tsmod = format!("{}{}", self.timestamp, modifier);
        if tsmod.is_empty() {
            url.to_string()
        } else {
            format!("{}/{}", tsmod, url)
        }
    }

    fn render_query(&self) -> String {
        let mut out = String::new();
        if !self.modifier.is_empty() {
            out.push_str(&self.modifier);
            out.push('/');
        }
        out.push_str(&self.timestamp);
        if !self.end_timestamp.is_empty() {
            out.push('-');
            out.push_str(&self.end_timestamp);
        }
        out.push_str("*/");
        out.push_str(&self.url);
        if self.mode == Mode::UrlQuery {
            out.push('*');
        }
        out
    }
}

impl fmt::Display for WbUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_query() {
            write!(f, "{}", self.render_query())
        } else {
            write!(f, "{}", self.render_replay(&self.modifier, &self.url))
        }
    }
}

impl FromStr for WbUrl {
    type Err = WbUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for WbUrl {
    type Error = WbUrlError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

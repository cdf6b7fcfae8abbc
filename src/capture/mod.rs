//! Boundary with the capture index.
//!
//! The index itself (source selection, canonicalization, fuzzy matching) lives
//! outside this crate. This module only defines what the rewriting core hands to
//! it and what it expects back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wburl::WbUrl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Captures of exactly this URL.
    Exact,
    /// Captures of every URL starting with this one.
    Prefix,
}

/// Lookup parameters derived from a parsed replay path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureQuery {
    pub url: String,
    pub match_type: MatchType,
    /// Timestamp the selected capture should be closest to (replay only).
    pub closest: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Whether the index may retry once with a fuzzy-matched query.
    pub allow_fuzzy: bool,
}

impl CaptureQuery {
    pub fn from_wb_url(wb_url: &WbUrl) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        if wb_url.is_query() {
            Self {
                url: wb_url.url().to_string(),
                match_type: if wb_url.is_url_query() {
                    MatchType::Prefix
                } else {
                    MatchType::Exact
                },
                closest: None,
                from: non_empty(wb_url.timestamp()),
                to: non_empty(wb_url.end_timestamp()),
                allow_fuzzy: false,
            }
        } else {
            Self {
                url: wb_url.url().to_string(),
                match_type: MatchType::Exact,
                closest: non_empty(wb_url.timestamp()),
                from: None,
                to: None,
                allow_fuzzy: true,
            }
        }
    }
}

/// One capture returned by the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub timestamp: String,
    pub original: String,
    pub mime: Option<String>,
    pub status: Option<u16>,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no captures found for: {0}")]
    NotFound(String),

    #[error("capture query failed: {0}")]
    Query(String),
}

impl CaptureError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CaptureError::NotFound(_))
    }
}

/// A capture index backend.
///
/// Implementations return [`CaptureError::NotFound`] rather than an empty list
/// when nothing matches, and are responsible for any fuzzy retry they perform
/// when `allow_fuzzy` is set.
pub trait CaptureIndex {
    fn load(&self, query: &CaptureQuery) -> Result<Vec<CaptureRecord>, CaptureError>;
}

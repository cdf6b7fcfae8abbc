use thiserror::Error;

/// Failure to interpret a replay request path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WbUrlError {
    #[error("invalid replay url: {0:?}")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("invalid rewrite rule pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown content kind: {0}")]
    UnknownContentKind(String),

    #[error("unknown cookie scope: {0}")]
    UnknownCookieScope(String),
}

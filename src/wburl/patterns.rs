use once_cell::sync::Lazy;
use regex::Regex;

/// `[modifier/][timestamp][-end_timestamp]*[/]url`
pub static QUERY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([\w\-:]+)/)?(\d*)(?:-(\d+))?\*/?(.+)$").unwrap()
});

/// `[timestamp][modifier_][/{0,3}]url`
pub static REPLAY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d*)([a-z]+_)?/{0,3}(.+)$").unwrap()
});

// Scheme separators that arrive percent-encoded, e.g. `http%3A%2F%2Fexample.com`
pub static PARTIAL_ENC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?%3A)?(?:%2F%2F)?").unwrap()
});

/// An explicit scheme followed by at least one slash.
pub static SCHEME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:/").unwrap()
});

use regex::Captures;
use tracing::{debug, trace};

use super::patterns::{PARTIAL_ENC_REGEX, QUERY_REGEX, REPLAY_REGEX, SCHEME_REGEX};
use super::{Mode, WbUrl};
use crate::error::WbUrlError;

const DEFAULT_SCHEME: &str = "http://";

pub(super) fn parse(raw: &str) -> Result<WbUrl, WbUrlError> {
    if raw.is_empty() {
        debug!("Rejecting empty replay url");
        return Err(WbUrlError::InvalidUrl(raw.to_string()));
    }

    let mut wb_url = match_query(raw)
        .or_else(|| match_replay(raw))
        .unwrap_or_else(|| WbUrl {
            mode: Mode::LatestReplay,
            timestamp: String::new(),
            end_timestamp: String::new(),
            modifier: String::new(),
            url: raw.to_string(),
        });

    wb_url.url = match normalize_target(&wb_url.url) {
        Some(url) => url,
        None => {
            debug!("Replay url {:?} has no target", raw);
            return Err(WbUrlError::InvalidUrl(raw.to_string()));
        }
    };

    trace!(
        "Parsed {:?} as mode={} timestamp={:?} modifier={:?} url={:?}",
        raw,
        wb_url.mode,
        wb_url.timestamp,
        wb_url.modifier,
        wb_url.url
    );
    Ok(wb_url)
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index).map_or("", |m| m.as_str()).to_string()
}

fn match_query(raw: &str) -> Option<WbUrl> {
    let caps = QUERY_REGEX.captures(raw)?;
    let mut url = group(&caps, 4);

    // A trailing `*` after the target widens the query to a url prefix
    let mode = match url.strip_suffix('*') {
        Some(prefix) => {
            url = prefix.to_string();
            Mode::UrlQuery
        }
        None => Mode::Query,
    };

    Some(WbUrl {
        mode,
        modifier: group(&caps, 1),
        timestamp: group(&caps, 2),
        end_timestamp: group(&caps, 3),
        url,
    })
}

fn match_replay(raw: &str) -> Option<WbUrl> {
    let caps = REPLAY_REGEX.captures(raw)?;
    let timestamp = group(&caps, 1);
    let mode = if timestamp.is_empty() {
        Mode::LatestReplay
    } else {
        Mode::Replay
    };

    Some(WbUrl {
        mode,
        timestamp,
        end_timestamp: String::new(),
        modifier: group(&caps, 2),
        url: group(&caps, 3),
    })
}

/// Gives the target an explicit scheme and a canonical `scheme://` separator.
///
/// Returns `None` when nothing but slashes is left of a scheme-less target.
pub(super) fn normalize_target(target: &str) -> Option<String> {
    let mut url = if SCHEME_REGEX.is_match(target) {
        target.to_string()
    } else {
        decode_scheme_separator(target)
    };

    match url.find(":/").filter(|_| SCHEME_REGEX.is_match(&url)) {
        None => {
            let host = url.trim_start_matches('/');
            if host.is_empty() {
                return None;
            }
            url = format!("{}{}", DEFAULT_SCHEME, host);
        }
        Some(inx) => {
            let after = inx + 2;
            if after < url.len() && !url[after..].starts_with('/') {
                url.insert(after, '/');
            }
        }
    }

    // Scheme only: keep as a blank target rather than an error
    if let Some(inx) = url.find(":/") {
        if url[inx + 1..].chars().all(|c| c == '/') {
            return Some(format!("{}://", &url[..inx]));
        }
    }

    Some(url)
}

fn decode_scheme_separator(url: &str) -> String {
    let len = PARTIAL_ENC_REGEX.find(url).map_or(0, |m| m.end());
    if len == 0 {
        return url.to_string();
    }

    match urlencoding::decode(&url[..len]) {
        Ok(decoded) => format!("{}{}", decoded, &url[len..]),
        Err(e) => {
            debug!("Could not decode scheme separator in {:?}: {}", url, e);
            url.to_string()
        }
    }
}

use super::{Mode, WbUrl};
use crate::error::WbUrlError;

fn parts(raw: &str) -> (Mode, String, String, String, String) {
    let wb_url = WbUrl::parse(raw).expect("Failed to parse replay url");
    (
        wb_url.mode(),
        wb_url.timestamp().to_string(),
        wb_url.modifier().to_string(),
        wb_url.url().to_string(),
        wb_url.to_string(),
    )
}

fn expect(mode: Mode, ts: &str, modifier: &str, url: &str, canonical: &str) -> (Mode, String, String, String, String) {
    (mode, ts.to_string(), modifier.to_string(), url.to_string(), canonical.to_string())
}

#[test]
fn test_replay_urls() {
    assert_eq!(
        parts("20131010000506/example.com"),
        expect(Mode::Replay, "20131010000506", "", "http://example.com", "20131010000506/http://example.com")
    );
    assert_eq!(
        parts("20130102im_/https://example.com"),
        expect(Mode::Replay, "20130102", "im_", "https://example.com", "20130102im_/https://example.com")
    );
    // single slash after the scheme
    assert_eq!(
        parts("20130102im_/https:/example.com"),
        expect(Mode::Replay, "20130102", "im_", "https://example.com", "20130102im_/https://example.com")
    );
}

#[test]
fn test_protocol_agnostic_becomes_http() {
    assert_eq!(
        parts("20130102im_///example.com"),
        expect(Mode::Replay, "20130102", "im_", "http://example.com", "20130102im_/http://example.com")
    );
}

#[test]
fn test_latest_replay_urls() {
    assert_eq!(
        parts("cs_/example.com"),
        expect(Mode::LatestReplay, "", "cs_", "http://example.com", "cs_/http://example.com")
    );
    assert_eq!(
        parts("https://example.com/xyz"),
        expect(Mode::LatestReplay, "", "", "https://example.com/xyz", "https://example.com/xyz")
    );
    assert_eq!(
        parts("https:/example.com/xyz"),
        expect(Mode::LatestReplay, "", "", "https://example.com/xyz", "https://example.com/xyz")
    );
}

#[test]
fn test_query_string_encoding_is_preserved() {
    assert_eq!(
        parts("https://example.com/xyz?a=%2f&b=%2E"),
        expect(
            Mode::LatestReplay,
            "",
            "",
            "https://example.com/xyz?a=%2f&b=%2E",
            "https://example.com/xyz?a=%2f&b=%2E"
        )
    );
}

#[test]
fn test_partially_encoded_scheme() {
    assert_eq!(
        parts("https%3A//example.com/"),
        expect(Mode::LatestReplay, "", "", "https://example.com/", "https://example.com/")
    );
    assert_eq!(
        parts("2014/http%3A%2F%2Fexample.com/"),
        expect(Mode::Replay, "2014", "", "http://example.com/", "2014/http://example.com/")
    );
}

#[test]
fn test_query_urls() {
    assert_eq!(
        parts("*/http://example.com/abc?def=a"),
        expect(Mode::Query, "", "", "http://example.com/abc?def=a", "*/http://example.com/abc?def=a")
    );
    assert_eq!(
        parts("*/http://example.com/abc?def=a*"),
        expect(Mode::UrlQuery, "", "", "http://example.com/abc?def=a", "*/http://example.com/abc?def=a*")
    );
    assert_eq!(
        parts("2010*/http://example.com/abc?def=a"),
        expect(Mode::Query, "2010", "", "http://example.com/abc?def=a", "2010*/http://example.com/abc?def=a")
    );
    assert_eq!(
        parts("json/*/http://example.com/abc?def=a"),
        expect(Mode::Query, "", "json", "http://example.com/abc?def=a", "json/*/http://example.com/abc?def=a")
    );
    assert_eq!(
        parts("timemap-link/2011*/http://example.com/abc?def=a"),
        expect(
            Mode::Query,
            "2011",
            "timemap-link",
            "http://example.com/abc?def=a",
            "timemap-link/2011*/http://example.com/abc?def=a"
        )
    );
}

#[test]
fn test_timestamp_range_keeps_lower_bound() {
    let wb_url = WbUrl::parse("2009-2015*/http://example.com/abc?def=a").unwrap();
    assert_eq!(wb_url.mode(), Mode::Query);
    assert_eq!(wb_url.timestamp(), "2009");
    assert_eq!(wb_url.end_timestamp(), "2015");
    assert_eq!(wb_url.to_string(), "2009-2015*/http://example.com/abc?def=a");
}

#[test]
fn test_leading_slashes_collapse() {
    assert_eq!(
        parts("///example.com"),
        expect(Mode::LatestReplay, "", "", "http://example.com", "http://example.com")
    );
    assert_eq!(
        parts("//example.com/"),
        expect(Mode::LatestReplay, "", "", "http://example.com/", "http://example.com/")
    );
    assert_eq!(
        parts("/example.com/"),
        expect(Mode::LatestReplay, "", "", "http://example.com/", "http://example.com/")
    );
    assert_eq!(WbUrl::parse("//////example.com/a").unwrap().url(), "http://example.com/a");
}

#[test]
fn test_predicates() {
    let u = WbUrl::parse("*/http://example.com/abc?def=a*").unwrap();
    assert!(u.is_url_query());
    assert!(u.is_query());
    assert!(!u.is_replay());

    let u2 = WbUrl::parse("20130102im_/https:/example.com").unwrap();
    assert!(u2.is_embed());
    assert!(u2.is_replay());
    assert!(!u2.is_latest_replay());
    assert!(!u2.is_query());

    let identity = WbUrl::parse("20130102id_/http://example.com").unwrap();
    assert!(!identity.is_embed());

    let latest = WbUrl::parse("http://example.com/").unwrap();
    assert!(latest.is_replay());
    assert!(latest.is_latest_replay());
    assert!(!latest.is_embed());
}

#[test]
fn test_empty_is_invalid() {
    assert_eq!(WbUrl::parse(""), Err(WbUrlError::InvalidUrl(String::new())));
}

#[test]
fn test_slashes_only_is_invalid() {
    assert!(WbUrl::parse("///").is_err());
    assert!(WbUrl::parse("2013im_/").is_err());
}

#[test]
fn test_blank_targets_are_accepted() {
    for raw in ["https:/", "https:///", "http://"] {
        let wb_url = WbUrl::parse(raw).expect("blank target should parse");
        assert!(wb_url.is_blank(), "{} should be blank", raw);
        assert_eq!(WbUrl::parse(&wb_url.to_string()).unwrap(), wb_url);
    }
    assert_eq!(WbUrl::parse("https:///").unwrap().url(), "https://");
    assert!(!WbUrl::parse("http://example.com").unwrap().is_blank());
}

#[test]
fn test_scheme_inside_query_is_not_the_scheme() {
    let wb_url = WbUrl::parse("2013/example.com/go?u=http://other.com/").unwrap();
    assert_eq!(wb_url.url(), "http://example.com/go?u=http://other.com/");
}

#[test]
fn test_with_replay_timestamp() {
    let latest = WbUrl::parse("cs_/example.com").unwrap();
    let pinned = latest.with_replay_timestamp("20140101");
    assert_eq!(pinned.mode(), Mode::Replay);
    assert_eq!(pinned.to_string(), "20140101cs_/http://example.com");
}

#[test]
fn test_render_replay() {
    let wb_url = WbUrl::parse("20131010/http://example.com/").unwrap();
    assert_eq!(wb_url.render_replay("", ""), "20131010/");
    assert_eq!(wb_url.render_replay("im_", "http://a.com/x.png"), "20131010im_/http://a.com/x.png");

    let latest = WbUrl::parse("http://example.com/").unwrap();
    assert_eq!(latest.render_replay("", "http://a.com/"), "http://a.com/");
}

use tracing::{debug, trace};
use url::Url;

use crate::error::WbUrlError;
use crate::wburl::WbUrl;

/// References that never point at an archived resource.
const NO_REWRITE_PREFIXES: [&str; 5] = ["#", "javascript:", "data:", "mailto:", "about:"];

/// Schemes treated as absolute references.
const PROTOCOLS: [&str; 6] = ["http:", "https:", "ftp:", "mms:", "rtsp:", "wais:"];

/// Maps references found in served content to their replay-local form.
///
/// Built once per request from the parsed replay path and the site prefix
/// (e.g. `/web/`), then shared read-only by every content and cookie rewriter
/// working on that response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRewriter {
    wb_url: WbUrl,
    prefix: String,
}

impl UrlRewriter {
    pub fn new(wb_url: WbUrl, prefix: impl Into<String>) -> Self {
        Self {
            wb_url,
            prefix: prefix.into(),
        }
    }

    /// Parses `wb_url` and builds a rewriter for it.
    pub fn parse(wb_url: &str, prefix: impl Into<String>) -> Result<Self, WbUrlError> {
        Ok(Self::new(WbUrl::parse(wb_url)?, prefix))
    }

    pub fn wb_url(&self) -> &WbUrl {
        &self.wb_url
    }

    /// Site prefix alone, without timestamp or modifier (`/web/`).
    ///
    /// Used to scope domain cookies to the whole replayed site.
    pub fn root_prefix(&self) -> &str {
        &self.prefix
    }

    /// Per-page replay prefix: site prefix plus timestamp and modifier
    /// (`/web/20131010im_/`). An absolute URL appended to it is a replay link.
    pub fn replay_prefix(&self) -> String {
        format!(
            "{}{}",
            self.prefix,
            self.wb_url.render_replay(self.wb_url.modifier(), "")
        )
    }

    /// Rewrites `url` with the current modifier.
    pub fn rewrite(&self, url: &str) -> String {
        self.rewrite_as(url, None)
    }

    /// Rewrites a reference found in content into a replay link.
    ///
    /// Absolute and protocol-relative references are kept as they are (the latter
    /// gain `http:`); root-relative and relative ones are resolved against the
    /// current target first. `modifier` overrides the page's own modifier, e.g.
    /// to mark an image reference as `im_`.
    ///
    /// Special-scheme references (`#`, `javascript:`, `data:` ...) and references
    /// that already carry the site prefix come back unchanged, as do relative
    /// references when the current target cannot serve as a base.
    pub fn rewrite_as(&self, url: &str, modifier: Option<&str>) -> String {
        if NO_REWRITE_PREFIXES.iter().any(|p| url.starts_with(p)) {
            return url.to_string();
        }

        if !self.prefix.is_empty() && self.prefix != "/" && url.starts_with(&self.prefix) {
            return url.to_string();
        }

        let absolute = if let Some(rest) = url.strip_prefix("//") {
            format!("http://{}", rest)
        } else if PROTOCOLS.iter().any(|p| url.starts_with(p)) {
            url.to_string()
        } else {
            match resolve_url(self.wb_url.url(), url) {
                Some(resolved) => resolved,
                None => {
                    debug!("Leaving {:?} unresolved against {:?}", url, self.wb_url.url());
                    return url.to_string();
                }
            }
        };

        let modifier = modifier.unwrap_or_else(|| self.wb_url.modifier());
        let rewritten = format!("{}{}", self.prefix, self.wb_url.render_replay(modifier, &absolute));
        trace!("Rewrote {:?} -> {:?}", url, rewritten);
        rewritten
    }

    /// Link to the capture of `url` at `timestamp`, keeping the current modifier.
    pub fn timestamp_url(&self, timestamp: &str, url: &str) -> String {
        let pinned = self.wb_url.with_replay_timestamp(timestamp);
        format!(
            "{}{}",
            self.prefix,
            pinned.render_replay(pinned.modifier(), url)
        )
    }
}

/// Resolves `reference` against `base` with standard relative-reference rules.
///
/// `.` and `..` segments are collapsed (never climbing above the root) and
/// root-relative references keep only the base's origin. Returns `None` when the
/// base is not a usable absolute URL.
///
/// The result is serialized the way `url::Url` does it: characters such as
/// spaces in a relative reference come back percent-encoded (`a b` becomes
/// `a%20b`). References with a recognised scheme never pass through here and
/// are kept verbatim by [`UrlRewriter::rewrite_as`].
pub fn resolve_url(base: &str, reference: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(reference).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_rewriter() -> UrlRewriter {
        UrlRewriter::parse("20131226101010/http://example.com/some/path/index.html", "/pywb/").unwrap()
    }

    #[test]
    fn test_prefixes() {
        let rewriter = page_rewriter();
        assert_eq!(rewriter.replay_prefix(), "/pywb/20131226101010/");
        assert_eq!(rewriter.root_prefix(), "/pywb/");

        let latest = UrlRewriter::parse("em_/http://example.com/", "/preview/").unwrap();
        assert_eq!(latest.replay_prefix(), "/preview/em_/");

        let bare = UrlRewriter::parse("http://example.com/", "/live/").unwrap();
        assert_eq!(bare.replay_prefix(), "/live/");
    }

    #[test]
    fn test_absolute_urls_keep_their_form() {
        let rewriter = page_rewriter();
        assert_eq!(
            rewriter.rewrite("https://other.com/a?b=%2F"),
            "/pywb/20131226101010/https://other.com/a?b=%2F"
        );
        assert_eq!(
            rewriter.rewrite("//cdn.example.com/lib.js"),
            "/pywb/20131226101010/http://cdn.example.com/lib.js"
        );
    }

    #[test]
    fn test_root_relative_resolves_against_origin() {
        let rewriter = page_rewriter();
        assert_eq!(
            rewriter.rewrite("/diff/path/"),
            "/pywb/20131226101010/http://example.com/diff/path/"
        );
        assert_eq!(rewriter.rewrite("/"), "/pywb/20131226101010/http://example.com/");
    }

    #[test]
    fn test_relative_resolves_against_page() {
        let rewriter = page_rewriter();
        assert_eq!(
            rewriter.rewrite("file.html"),
            "/pywb/20131226101010/http://example.com/some/path/file.html"
        );
        assert_eq!(
            rewriter.rewrite("../other/./x.css"),
            "/pywb/20131226101010/http://example.com/some/other/x.css"
        );
        assert_eq!(
            rewriter.rewrite("../../../../top.html"),
            "/pywb/20131226101010/http://example.com/top.html"
        );
    }

    #[test]
    fn test_modifier_override() {
        let rewriter = page_rewriter();
        assert_eq!(
            rewriter.rewrite_as("/logo.png", Some("im_")),
            "/pywb/20131226101010im_/http://example.com/logo.png"
        );
    }

    #[test]
    fn test_special_references_untouched() {
        let rewriter = page_rewriter();
        for url in ["#top", "javascript:void(0)", "data:image/png;base64,AAAA", "mailto:a@b.c", "about:blank"] {
            assert_eq!(rewriter.rewrite(url), url);
        }
        let already = "/pywb/20131226101010/http://example.com/";
        assert_eq!(rewriter.rewrite(already), already);
    }

    #[test]
    fn test_unresolvable_base_leaves_relative_alone() {
        let rewriter = UrlRewriter::parse("2013/http://", "/web/").unwrap();
        assert_eq!(rewriter.rewrite("a/b.html"), "a/b.html");
        assert_eq!(rewriter.rewrite("http://example.com/"), "/web/2013/http://example.com/");
    }

    #[test]
    fn test_relative_references_are_serialized_by_url() {
        let rewriter = page_rewriter();
        assert_eq!(
            rewriter.rewrite("img/a b|c.png"),
            "/pywb/20131226101010/http://example.com/some/path/img/a%20b|c.png"
        );
        assert_eq!(
            rewriter.rewrite("http://example.com:80/x.png"),
            "/pywb/20131226101010/http://example.com:80/x.png"
        );
    }

    #[test]
    fn test_timestamp_url() {
        let rewriter = page_rewriter();
        assert_eq!(
            rewriter.timestamp_url("20200101", "http://example.com/"),
            "/pywb/20200101/http://example.com/"
        );
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("http://example.com/", "/static/styles/../../images/logo.png").as_deref(),
            Some("http://example.com/images/logo.png")
        );
        assert_eq!(
            resolve_url("http://example.com/a/b/", "c/").as_deref(),
            Some("http://example.com/a/b/c/")
        );
        assert_eq!(resolve_url("not a url", "x"), None);
    }
}

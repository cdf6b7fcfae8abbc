//! Addressing and rewriting core of a web-archive replay engine.
//!
//! A request path such as `20131010im_/http://example.com/` is parsed into a
//! [`WbUrl`], wrapped in a [`UrlRewriter`] together with the site prefix, and then
//! used to rewrite script, style and markup content ([`RegexRewriter`]) and
//! `Set-Cookie` headers ([`CookieRewriter`]) so that every reference resolves back
//! through the replay system.

pub mod capture;
pub mod config;
pub mod cookie;
pub mod error;
pub mod rewrite;
pub mod url_rewriter;
pub mod utils;
pub mod wburl;

pub use cookie::{CookieEntry, CookieRewriter, CookieScope};
pub use error::{RewriteError, WbUrlError};
pub use rewrite::{ContentKind, RegexRewriter, Rule, Transform};
pub use url_rewriter::UrlRewriter;
pub use wburl::{Mode, WbUrl};

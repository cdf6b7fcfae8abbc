use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::cookie::CookieScope;
use crate::rewrite::DEFAULT_SENTINEL;

/// Default site prefix under which captures are replayed
pub const DEFAULT_PREFIX: &str = "/web/";

/// Environment variables with this prefix override file settings
/// (`REPLAY_REWRITE_PREFIX`, `REPLAY_REWRITE_COOKIE_SCOPE`, ...).
pub const ENV_PREFIX: &str = "REPLAY_REWRITE";

/// Settings shared by every rewriter built in a process
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Site prefix placed before every replay link
    pub prefix: String,

    /// Prefix for script globals redirected to the client-side shim
    pub sentinel_prefix: String,

    /// Scoping policy for cookies without `Domain` or `Path`
    pub cookie_scope: CookieScope,

    /// Directory for log files (logs go to stderr when unset)
    pub log_dir: Option<String>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            sentinel_prefix: DEFAULT_SENTINEL.to_string(),
            cookie_scope: CookieScope::Minimal,
            log_dir: None,
        }
    }
}

impl RewriteConfig {
    /// Loads settings from an optional file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));

        let settings = builder.build().context("Failed to read configuration")?;
        settings
            .try_deserialize()
            .context("Invalid rewrite configuration")
    }
}

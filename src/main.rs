use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, warn};

use replay_rewrite::config::RewriteConfig;
use replay_rewrite::utils::logger::init_logger;
use replay_rewrite::{ContentKind, CookieRewriter, CookieScope, RegexRewriter, UrlRewriter, WbUrl};

/// Replay-path addressing and content rewriting for archived captures
#[derive(Debug, Parser)]
#[command(name = "replay-rewrite", version, about)]
struct Cli {
    /// Configuration file (any format the `config` crate understands)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Site prefix placed before replay links (overrides the configuration)
    #[arg(long, global = true)]
    prefix: Option<String>,

    /// Write logs to a timestamped file in this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a replay path and print it as JSON
    Parse {
        wburl: String,
    },
    /// Rewrite a single link found on the page addressed by --wburl
    Url {
        #[arg(long)]
        wburl: String,
        /// Modifier to use instead of the page's own (e.g. im_)
        #[arg(long)]
        modifier: Option<String>,
        candidate: String,
    },
    /// Rewrite script, style or markup content from a file or stdin
    Rewrite {
        #[arg(long)]
        wburl: String,
        /// js, css or xml
        #[arg(long)]
        kind: ContentKind,
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Rewrite a Set-Cookie header value
    Cookie {
        #[arg(long)]
        wburl: String,
        /// minimal or replay-path
        #[arg(long)]
        scope: Option<CookieScope>,
        header: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RewriteConfig::load(cli.config.as_deref())?;
    if let Some(prefix) = cli.prefix {
        config.prefix = prefix;
    }
    if cli.log_dir.is_some() {
        config.log_dir = cli.log_dir;
    }
    init_logger(config.log_dir.as_deref())?;
    debug!("Running with {:?}", config);

    match cli.command {
        Command::Parse { wburl } => {
            let wb_url = WbUrl::parse(&wburl)?;
            println!("{}", serde_json::to_string_pretty(&wb_url)?);
        }
        Command::Url {
            wburl,
            modifier,
            candidate,
        } => {
            let url_rewriter = UrlRewriter::parse(&wburl, config.prefix.as_str())?;
            println!("{}", url_rewriter.rewrite_as(&candidate, modifier.as_deref()));
        }
        Command::Rewrite { wburl, kind, input } => {
            let url_rewriter = UrlRewriter::parse(&wburl, config.prefix.as_str())?;
            let content = read_content(input.as_deref())?;
            let rewriter = match kind {
                ContentKind::Script => RegexRewriter::script_with_sentinel(&config.sentinel_prefix, Vec::new()),
                other => RegexRewriter::for_kind(other, Vec::new()),
            };
            print!("{}", rewriter.rewrite(&content, &url_rewriter));
        }
        Command::Cookie { wburl, scope, header } => {
            let url_rewriter = UrlRewriter::parse(&wburl, config.prefix.as_str())?;
            let scope = scope.unwrap_or(config.cookie_scope);
            let headers = CookieRewriter::with_scope(&url_rewriter, scope).rewrite(&header);
            if headers.is_empty() {
                warn!("No valid cookies in {:?}", header);
            }
            for (name, value) in headers {
                println!("{}: {}", name, value);
            }
        }
    }

    Ok(())
}

fn read_content(input: Option<&std::path::Path>) -> Result<String> {
    let mut bytes = Vec::new();
    match input {
        Some(path) => {
            bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        }
        None => {
            std::io::stdin()
                .read_to_end(&mut bytes)
                .context("Failed to read stdin")?;
        }
    }

    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(e) => {
            warn!("Content is not valid UTF-8, replacing invalid sequences");
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

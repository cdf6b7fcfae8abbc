use anyhow::{anyhow, Result};
use replay_rewrite::{CookieRewriter, UrlRewriter, WbUrl};
use std::env;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <wburl> [link ...]", args[0]);
        return Err(anyhow!("Missing replay url argument"));
    }

    let wb_url = WbUrl::parse(&args[1])?;
    println!("Replay url: {}", args[1]);
    println!("  Mode:      {}", wb_url.mode());
    println!("  Timestamp: {}", wb_url.timestamp());
    if !wb_url.end_timestamp().is_empty() {
        println!("  End:       {}", wb_url.end_timestamp());
    }
    println!("  Modifier:  {}", wb_url.modifier());
    println!("  Target:    {}", wb_url.url());
    println!("  Canonical: {}", wb_url);

    if wb_url.is_query() {
        return Ok(());
    }

    let url_rewriter = UrlRewriter::new(wb_url, "/web/");
    println!("\nReplay prefix: {}", url_rewriter.replay_prefix());

    for (i, link) in args[2..].iter().enumerate() {
        println!("  {}. {} -> {}", i + 1, link, url_rewriter.rewrite(link));
    }

    let cookies = CookieRewriter::new(&url_rewriter).rewrite("session=1; Path=/; HttpOnly");
    for (name, value) in cookies {
        println!("\nSample cookie: {}: {}", name, value);
    }

    Ok(())
}

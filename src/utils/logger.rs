use anyhow::Result;
use chrono::Local;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global tracing subscriber.
///
/// With `log_dir`, logs go to a timestamped file in that directory (created if
/// missing); otherwise they go to stderr so stdout stays free for output.
/// `RUST_LOG` selects the level, defaulting to `info`.
pub fn init_logger(log_dir: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    match log_dir {
        Some(dir) => {
            if !Path::new(dir).exists() {
                fs::create_dir_all(dir)?;
            }
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            let log_file = format!("{}/replay_rewrite_{}.log", dir, timestamp);
            let subscriber = builder
                .with_ansi(false)
                .with_writer(Mutex::new(fs::File::create(&log_file)?))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            info!("Logger initialized, writing to {}", log_file);
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

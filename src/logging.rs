//! Subscriber setup for the binary.
//!
//! Events go to stderr and to a per-day file under the logs directory. The
//! level defaults to `info` (`debug` in verbose mode) and `RUST_LOG` overrides
//! it. Quiet mode only trims the console; the file keeps everything.
//! Events with the [`FILE_ONLY_TARGET`] target skip the console, for
//! messages the caller already shows to the user.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::filter::{LevelFilter, filter_fn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::Config;

/// Target for events that are written to the log file only.
pub const FILE_ONLY_TARGET: &str = "ozon_labels::file";

/// Install the global subscriber and return today's log file path.
///
/// Calling it again after a subscriber is installed leaves the first one in
/// place.
///
/// # Errors
///
/// Fails if the logs directory or the log file cannot be created.
pub fn init(config: &Config) -> io::Result<PathBuf> {
    std::fs::create_dir_all(&config.logs_dir)?;

    let path = config.log_path_for(chrono::Local::now().date_naive());
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let default_level = if config.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_level = if config.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::TRACE
    };

    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(filter_fn(move |meta| {
            console_accepts(meta.target(), meta.level(), console_level)
        }));

    let logfile = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(logfile)
        .try_init();

    Ok(path)
}

fn console_accepts(target: &str, level: &Level, max: LevelFilter) -> bool {
    target != FILE_ONLY_TARGET && *level <= max
}

//! Tracing setup.
//!
//! Text and JSON modes log to stderr. The TUI owns the terminal, so it logs to a file
//! under the user's cache directory instead.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub enum LogTarget {
    Stderr,
    File,
}

fn filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("news-nexus").join("news-nexus.log"))
}

/// Install the global subscriber. Returns the log file path when logging to a file.
pub fn init(target: LogTarget, verbose: bool) -> Result<Option<PathBuf>> {
    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter(verbose))
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))?;
            Ok(None)
        }
        LogTarget::File => {
            let Some(path) = log_path() else {
                return Ok(None);
            };
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("open {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter(verbose))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))?;
            Ok(Some(path))
        }
    }
}

//! Tracing setup for the `urleval` binary.
//!
//! Events go to `~/.local/state/urleval/urleval.log` (appended across runs, so
//! one file holds the history of evaluation runs). When that file cannot be
//! opened the binary calls [`init_logging_stderr`] instead. The filter comes
//! from `URLEVAL_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`].

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,urleval_core=debug";

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "URLEVAL_LOG";

const LOG_FILE: &str = "urleval.log";

/// Location of the log file under the XDG state dir.
pub fn default_log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urleval")?;
    Ok(xdg_dirs.get_state_home().join("urleval").join(LOG_FILE))
}

/// Opens `path` for appending, creating missing parent directories.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Filter for `directives`, or [`DEFAULT_FILTER`] when they are absent or do
/// not parse.
pub fn filter_for(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn env_filter() -> EnvFilter {
    let directives = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    filter_for(directives.as_deref())
}

/// Installs the global subscriber writing to [`default_log_path`] and returns
/// that path. Errors leave no subscriber installed.
pub fn init_logging() -> Result<PathBuf> {
    let path = default_log_path()?;
    let file = open_log_file(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    tracing::info!(path = %path.display(), "urleval logging initialized");
    Ok(path)
}

/// Stderr-only subscriber for when [`init_logging`] fails.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

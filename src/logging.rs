use std::env;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::utils::get_data_dir;

pub const LOG_ENV: &str = "LSC_TRAINER_LOG";
pub const LOG_FILE_NAME: &str = "lsc-trainer.log";

/// Where log lines go. The full-screen interface owns the terminal, so
/// sessions that draw it log to a file instead of stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn data_file() -> Result<Self> {
        Ok(Self::File(get_data_dir()?.join(LOG_FILE_NAME)))
    }
}

/// `LSC_TRAINER_LOG` wins over `RUST_LOG`. Blank values count as unset.
pub fn filter_from_env(app_value: Option<String>, rust_log: Option<String>) -> Option<String> {
    app_value
        .into_iter()
        .chain(rust_log)
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Installs the global subscriber only when a filter is configured, so the
/// CLI stays quiet by default.
pub fn init_tracing(target: LogTarget) -> Result<()> {
    match filter_from_env(env::var(LOG_ENV).ok(), env::var("RUST_LOG").ok()) {
        Some(filter) => init_tracing_with_filter(&filter, target),
        None => Ok(()),
    }
}

pub fn init_tracing_with_filter(filter: &str, target: LogTarget) -> Result<()> {
    static INIT: Once = Once::new();

    let file = match &target {
        LogTarget::Stderr => None,
        LogTarget::File(path) => Some(open_log_file(path)?),
    };

    INIT.call_once(|| {
        let filter_layer = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
        let registry = tracing_subscriber::registry().with(filter_layer);
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact();

        let _ = match file {
            Some(file) => registry
                .with(fmt_layer.with_ansi(false).with_writer(Mutex::new(file)))
                .try_init(),
            None => registry
                .with(fmt_layer.with_writer(std::io::stderr))
                .try_init(),
        };
    });
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

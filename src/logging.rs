use crate::utils::app_data_dir;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

pub type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

/// Send logs to `<data dir>/hifz/hifz.log`; stdout belongs to the TUI.
///
/// `RUST_LOG` sets the initial filter; otherwise `info` until the config is read.
pub fn init_tracing() -> Result<ReloadHandle> {
    let dir = app_data_dir()?;
    fs::create_dir_all(&dir).with_context(|| format!("Could not create {}", dir.display()))?;
    let path = dir.join("hifz.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Could not open {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    info!(path = %path.display(), "Logging initialized");
    Ok(handle)
}

/// Apply the configured level unless `RUST_LOG` already chose one.
pub fn apply_log_level(handle: &ReloadHandle, level: &str) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    let parsed = match EnvFilter::builder().parse(level) {
        Ok(filter) => filter,
        Err(err) => {
            warn!(%level, "Ignoring invalid log level: {err}");
            return;
        }
    };
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level: {err}");
    }
}

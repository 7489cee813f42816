use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chatter_core::ChatterConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Open (append) the log file, creating parent directories.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {:?}", parent))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {:?}", path))
}

pub fn build_filter(config: &ChatterConfig) -> EnvFilter {
    EnvFilter::try_new(config.log_level())
        .unwrap_or_else(|_| EnvFilter::new("chatter_tui=info,chatter_core=info"))
}

/// The terminal belongs to the UI, so logs go to a file. Without a usable
/// location logging stays off.
pub fn init(config: &ChatterConfig) -> Result<()> {
    let Some(path) = config.log_file_path() else {
        return Ok(());
    };
    let file = open_log_file(&path)?;
    let writer = Mutex::new(file);

    let registry = tracing_subscriber::registry().with(build_filter(config));

    if config.logging.json_format {
        registry
            .with(fmt::layer().json().with_writer(writer).with_ansi(false))
            .try_init()
            .context("Failed to install log subscriber")?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .try_init()
            .context("Failed to install log subscriber")?;
    }

    Ok(())
}

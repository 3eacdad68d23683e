//! Logging setup: a global `tracing` subscriber writing to stdout, filtered by
//! `RUST_LOG`.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "info,dataset_explorer=debug";

static INITIALIZED: OnceLock<()> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber. Subsequent calls are no-ops.
pub fn init() -> Result<(), LoggingError> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }
    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(fmt::layer().with_target(false).with_writer(std::io::stdout));
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = INITIALIZED.set(());
    tracing::info!("Logging initialized");
    Ok(())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

use std::fs::OpenOptions;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::JsonFields;
use tracing_subscriber::prelude::*;

use crate::config::Settings;

/// Initialize file-based JSON logging under the nvx home. Nothing in the
/// core writes to stdout/stderr; command output stays clean.
pub fn init(settings: &Settings) -> anyhow::Result<()> {
    std::fs::create_dir_all(&settings.home).inspect_err(|e| {
        eprintln!("Failed to create nvx home directory: {e}");
    })?;

    let log_path = settings.log_path();
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .inspect_err(|e| {
            eprintln!("Failed to open log file {log_path:?}: {e}");
        })?;

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(log_file)
        .fmt_fields(JsonFields::default());

    // Use RUST_LOG if set, otherwise default to INFO
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .init();

    Ok(())
}

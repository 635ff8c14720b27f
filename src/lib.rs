pub mod capture;
pub mod driver;
pub mod export;
pub mod geometry;
pub mod heatmap;
pub mod runtime;
pub mod session;
pub mod settings;
mod utils;

use std::path::PathBuf;

use anyhow::Context;
use settings::SettingsStore;

/// Environment variable naming the settings file.
pub const SETTINGS_ENV: &str = "GAZE_CAPTURE_SETTINGS";
const DEFAULT_SETTINGS_FILE: &str = "capture_settings.json";

pub fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("gaze-capture starting up...");

    let settings_path = std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let store = SettingsStore::new(settings_path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(driver::drive(store.settings(), store.path().clone()))
}

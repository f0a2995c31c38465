//! Persistent settings for the stereo camera and head tracking.
//!
//! The file lives at `<platform config dir>/vrcam/config.toml`. Every section
//! and field is optional; missing values fall back to [`AppConfig::default`].

mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

const APP_DIR: &str = "vrcam";
const CONFIG_FILE: &str = "config.toml";

/// Returns the default config file path, creating its directory.
pub fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join(APP_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join(CONFIG_FILE))
}

/// Load and validate the config at the default path.
///
/// A missing file is written out with defaults so there is something to edit.
pub fn load_config() -> Result<AppConfig> {
    let path = config_path()?;
    if path.exists() {
        load_config_from(&path)
    } else {
        let config = AppConfig::default();
        save_config_to(&path, &config)?;
        info!(?path, "No config found, wrote defaults");
        Ok(config)
    }
}

/// Parse and validate a config file.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    info!(?path, "Loaded config");
    Ok(config)
}

/// Save config to the default path.
pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(&config_path()?, config)
}

/// Write `config` as pretty TOML to `path`.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(?path, "Saved config");
    Ok(())
}

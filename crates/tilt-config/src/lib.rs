mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

const APP_DIR: &str = "tilt-app";
const CONFIG_FILE: &str = "config.toml";

/// `<per-user config dir>/tilt-app/config.toml`. Nothing is created on disk
/// until the config is saved.
pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("no per-user config directory on this platform")?;
    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}

/// Load config from the default location, or return defaults if none exists.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path()?)
}

/// Save config to the default location.
pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(config, &config_path()?)
}

/// Missing file → defaults. Out-of-range values are replaced with defaults
/// (see [`AppConfig::sanitized`]).
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        info!(?path, "No config found, using defaults");
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    info!(?path, "Loaded config");
    Ok(config.sanitized())
}

/// Write `config`, creating the parent directory if needed.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, toml::to_string_pretty(config)?)?;
    info!(?path, "Saved config");
    Ok(())
}

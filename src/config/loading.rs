//! Settings file location and store construction.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::OnceLock;

use super::{ConfigStore, TomlFileStore};
use crate::common::constants::{APP_DIR_NAME, SETTINGS_FILE_NAME};

/// Configuration directory override, set once at startup from `--config`.
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// This can only be called once, typically at startup.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// Get the custom configuration directory if one was set.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Directory holding `settings.toml`.
pub fn get_config_base_dir() -> Result<PathBuf> {
    if let Some(custom) = get_custom_config_dir() {
        return Ok(custom);
    }
    let base = dirs::config_dir().context("Could not determine the user configuration directory")?;
    Ok(base.join(APP_DIR_NAME))
}

/// Full path of the settings file.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_config_base_dir()?.join(SETTINGS_FILE_NAME))
}

/// Open the settings file at its standard location and load it.
///
/// The file is not created here; it appears with the first saved setting,
/// which keeps "never written" distinguishable for first-run defaults.
pub fn open() -> Result<ConfigStore> {
    let path = get_settings_path()?;
    Ok(ConfigStore::new(Box::new(TomlFileStore::new(path))))
}

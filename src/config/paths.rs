//! Platform-specific configuration and data paths.

use crate::constants::{APP_NAME, ASSETS_DIR_NAME};
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// Get the configuration directory for the current platform.
///
/// - Linux: `~/.config/insectiscan/`
/// - macOS: `~/Library/Application Support/insectiscan/`
/// - Windows: `%APPDATA%\insectiscan\config\`
pub fn config_dir() -> Result<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the data directory for the current platform.
pub fn data_dir() -> Result<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(Error::DataDirNotFound)
}

/// Default asset bundle location, `<data dir>/assets`.
pub fn default_assets_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join(ASSETS_DIR_NAME))
}

//! Storage Layer
//!
//! Resolves where the scanner keeps its configuration.

use anyhow::Result;
use std::path::PathBuf;

/// Get the configuration directory. It is not created here; saving a
/// config creates it.
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "mrzscanner", "MrzScanner")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Default location of `config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

//! Configuration module for robust-search
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_VAR: &str = "RAG_SEARCH_SETTINGS_PATH";

/// Default locations searched for settings.yml, in order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/robust-search/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("robust-search/settings.yml"));
    }
    paths
}

/// Find the settings file to use.
///
/// An explicit path must exist. Otherwise the environment variable and then
/// the default paths are tried; `None` means defaults should be used.
pub fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Settings file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    let env_path = std::env::var(SETTINGS_PATH_VAR).ok().map(PathBuf::from);

    Ok(env_path
        .into_iter()
        .chain(default_paths())
        .find(|path| path.exists()))
}

/// Load settings from a file (or defaults), apply environment overrides and validate
pub fn load_from(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    settings.merge_env();
    settings.validate()?;
    Ok(settings)
}

/// Locate and load settings
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let path = locate(explicit)?;
    load_from(path.as_deref())
}

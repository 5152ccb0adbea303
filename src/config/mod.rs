//! Configuration module for the users search adapter
//!
//! Handles loading and validating settings from YAML files, credentials from
//! the cloud SDK's JSON file, and overrides from environment variables.

mod credentials;
mod settings;

pub use credentials::Credentials;
pub use settings::*;

use crate::error::Result;
use std::path::PathBuf;
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_ENV: &str = "USERS_SEARCH_SETTINGS_PATH";

/// Default places searched for settings.yml, in order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("users-search/settings.yml"));
    }
    paths
}

/// Load settings from `USERS_SEARCH_SETTINGS_PATH`, the default paths, or
/// defaults, then apply environment overrides.
pub fn load() -> Result<Settings> {
    load_from(|key| std::env::var(key).ok(), &default_paths())
}

/// Same as [`load`], reading variables through `lookup` and trying
/// `candidates` in order.
///
/// An explicitly named file that does not exist is an error; missing
/// candidates are skipped.
pub fn load_from<F>(lookup: F, candidates: &[PathBuf]) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = match lookup(SETTINGS_PATH_ENV) {
        Some(path) => {
            info!("Loading settings from: {}", path);
            Settings::from_file(&path)?
        }
        None => match candidates.iter().find(|p| p.exists()) {
            Some(path) => {
                info!("Loading settings from: {}", path.display());
                Settings::from_file(path)?
            }
            None => {
                info!("No settings file found, using defaults");
                Settings::default()
            }
        },
    };

    settings.merge_from(lookup);
    settings.validate()?;
    Ok(settings)
}

//! Ledger location.
//!
//! The data path comes from `IRONING_DATA_PATH` if set, then `[storage] path` in
//! config.toml, then `data/clothes_data.csv`.

use crate::config::settings::Settings;
use std::path::PathBuf;

/// Default ledger location, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data/clothes_data.csv";

/// Environment variable that overrides the ledger location.
pub const DATA_PATH_VAR: &str = "IRONING_DATA_PATH";

/// Picks the ledger path from an explicit override, the settings, or the default.
#[must_use]
pub fn resolve_data_path(env_override: Option<String>, settings: &Settings) -> PathBuf {
    env_override
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| settings.storage.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

/// Gets the ledger path using `IRONING_DATA_PATH` from the environment.
#[must_use]
pub fn get_data_path(settings: &Settings) -> PathBuf {
    resolve_data_path(std::env::var(DATA_PATH_VAR).ok(), settings)
}

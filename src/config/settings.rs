//! Application settings loaded from config.toml
//!
//! Every section is optional. A missing file means all defaults, so a fresh checkout
//! runs without any configuration beyond the bot token.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Environment variable that points at a different settings file.
pub const CONFIG_PATH_VAR: &str = "IRONING_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the ledger lives
    pub storage: StorageSettings,
    /// How times are shown in replies
    pub display: DisplaySettings,
    /// Staff who hand garments back
    pub staff: StaffSettings,
}

/// `[storage]` section
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Path of the CSV ledger; see [`super::storage::resolve_data_path`]
    pub path: Option<PathBuf>,
}

/// `[display]` section
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// 12- or 24-hour clock
    pub clock: Clock,
}

/// `[staff]` section
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StaffSettings {
    /// Names offered when recording who received a return
    pub names: Vec<String>,
}

/// Clock used when formatting times for display. Storage always uses 24-hour time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Clock {
    /// `02:05 PM`
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    /// `14:05`
    #[serde(rename = "24h")]
    TwentyFourHour,
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns `Error::Config` if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid or a value has the wrong type
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No settings file at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(e) => {
            return Err(Error::Config {
                message: format!("Failed to read {}: {e}", path.display()),
            });
        }
    };

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Loads settings from `IRONING_CONFIG`, or ./config.toml when unset.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_settings(path)
}

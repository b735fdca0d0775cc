//! Unified error type for the ironing tracker.
//!
//! Every fallible operation in the crate returns [`Result`]. Store and policy code
//! raise the domain variants (`StorageUnavailable`, `Validation`, `IdentityNotFound`);
//! the bot layer decides which of them become user-facing replies.

use crate::entities::RecordId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The medium exists but could not be read as a table.
    #[error("Storage unavailable at {path:?}: {message}")]
    StorageUnavailable { path: PathBuf, message: String },

    #[error("Invalid value for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("No record with id {id}")]
    IdentityNotFound { id: RecordId },

    /// Every id up to `u64::MAX` is taken.
    #[error("No record ids left after {last}")]
    IdsExhausted { last: RecordId },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] on the named field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error is caused by user input rather than the environment.
    ///
    /// The bot answers these with a plain reply instead of routing them to `on_error`.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::IdentityNotFound { .. })
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

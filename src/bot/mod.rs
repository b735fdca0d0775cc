//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the ironing tracker, including
//! all slash commands, autocomplete handlers, the shared bot context, and the
//! client bootstrap.

/// Discord command implementations (intake, records, updates, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::settings::Settings,
    core::store::RecordStore,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::sync::{Arc, Mutex};
use tracing::{error, info, instrument, warn};

/// The ledger shared by every command invocation.
///
/// The lock is held for one whole load-mutate-save cycle so two commands never
/// interleave on the file. It is never held across an `.await`.
pub type StorePool = Arc<Mutex<RecordStore>>;

/// Shorthand for the poise context every command receives.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Shared data available to all bot commands.
pub struct BotData {
    /// The CSV ledger
    pub store: StorePool,
    /// Settings loaded at startup
    pub settings: Arc<Settings>,
}

impl BotData {
    /// Creates a new `BotData` around the given store and settings.
    #[must_use]
    pub fn new(store: RecordStore, settings: Settings) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            settings: Arc::new(settings),
        }
    }

    /// Runs `operation` with exclusive access to the store.
    ///
    /// # Errors
    /// `Storage` if another command panicked while holding the lock, otherwise
    /// whatever `operation` returns.
    pub fn with_store<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&RecordStore) -> Result<T>,
    {
        let store = self
            .store
            .lock()
            .map_err(|_| Error::Storage("record store lock poisoned".to_string()))?;
        operation(&store)
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } if error.is_user_error() => {
            warn!("Rejected `{}`: {error}", ctx.command().name);
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error:?}", ctx.command().name);
            if let Err(e) = ctx
                .say("❌ Something went wrong while updating the records. Nothing was changed.")
                .await
            {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
///
/// # Errors
/// Returns an error if the client cannot be created or the gateway connection fails.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::intake(),
                commands::records(),
                commands::export(),
                commands::delete(),
                commands::summary(),
                commands::payment(),
                commands::payment_by_date(),
                commands::receive(),
                commands::edit(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::Category, test_utils::*};

    #[test]
    fn test_with_store_runs_operation() -> Result<()> {
        let (_dir, store) = setup_test_store()?;
        let data = BotData::new(store, Settings::default());

        let record = data.with_store(|store| create_test_record(store, "Asha", &[(Category::Shirts, 1)]))?;
        let count = data.with_store(|store| Ok(store.load()?.len()))?;

        assert_eq!(record.total_clothes(), 1);
        assert_eq!(count, 1);
        Ok(())
    }
}

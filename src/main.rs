use dotenvy::dotenv;
use ironing_tracker::{
    bot::{self, BotData},
    config::{settings, storage},
    core::store::RecordStore,
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load settings (a missing config.toml means defaults)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;

    // 4. Open the ledger and make sure it is readable before going online
    let store = RecordStore::new(storage::get_data_path(&settings));
    let table = store
        .load()
        .inspect_err(|e| error!("Failed to read ledger: {e}"))?;
    info!(
        "Ledger at {} holds {} records.",
        store.path().display(),
        table.len()
    );

    // 5. Run the bot
    // DISCORD_BOT_TOKEN is loaded here, directly before use, not stored in settings
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(store, settings)).await
}

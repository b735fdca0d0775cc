//! General Discord commands - ping and help.
//! These commands don't touch the ledger.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{bot::Context, errors::Result};

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        let help_text = "**Ironing Tracker Help**\n\
        Every garment batch taken in at the counter is one record with an id like `#7`.\n\n\
        **Counter**\n\
        • `/intake <name> [counts] [date] [time]` - Records garments taken in.\n\
        • `/receive <id> <received_by> [received_date] [counts] [status]` - Records garments handed back.\n\
        • `/payment <id> <status>` - Marks one record Paid or Pending.\n\
        • `/payment_by_date <date> <status>` - Marks every record from one day.\n\n\
        **Records**\n\
        • `/records [date]` - Lists records, optionally for one day (YYYY-MM-DD).\n\
        • `/summary [date]` - Totals for a day (default today).\n\
        • `/edit <id> <field> <value>` - Corrects one column of one record.\n\
        • `/delete <ids>` - Deletes records, e.g. `3, 5, 8`.\n\
        • `/export` - Downloads the whole table as CSV.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

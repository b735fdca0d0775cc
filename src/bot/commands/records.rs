//! Record Discord commands - listing, summaries, export and delete.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        core::{
            fields::parse_date_input,
            records::{parse_record_ids, request_delete, request_filtered_view},
            report::{format_daily_summary, outstanding, render_records, summarize_day},
            store::export as export_table,
        },
        errors::Result,
    };
    use chrono::Local;
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Records listed per reply; more would overrun Discord's message limit.
    const MAX_LINES: usize = 15;

    /// Lists records, optionally only those taken in on one day.
    #[poise::command(slash_command, prefix_command)]
    pub async fn records(
        ctx: Context<'_>,
        #[description = "Only this day (YYYY-MM-DD)"] date: Option<String>,
    ) -> Result<()> {
        let date = date.as_deref().map(|d| parse_date_input("Date", d)).transpose()?;
        let clock = ctx.data().settings.display.clock;

        let records = ctx.data().with_store(|store| match date {
            Some(date) => request_filtered_view(store, date),
            None => Ok(store.load()?.records().to_vec()),
        })?;

        let heading = date.map_or_else(
            || "📋 **All records**".to_string(),
            |date| format!("📋 **Records for {date}**"),
        );
        if records.is_empty() {
            ctx.say(format!("{heading}\nℹ️ No records found.")).await?;
            return Ok(());
        }

        let body = render_records(&records, clock, MAX_LINES)?;
        ctx.say(format!("{heading} ({})\n{body}", records.len())).await?;
        Ok(())
    }

    /// Shows totals for one day and how many records still have garments in the shop.
    #[poise::command(slash_command, prefix_command)]
    pub async fn summary(
        ctx: Context<'_>,
        #[description = "Day to summarise (YYYY-MM-DD), default today"] date: Option<String>,
    ) -> Result<()> {
        let date = date
            .as_deref()
            .map(|d| parse_date_input("Date", d))
            .transpose()?
            .unwrap_or_else(|| Local::now().date_naive());

        let (day, records_waiting, garments_waiting) = ctx.data().with_store(|store| {
            let table = store.load()?;
            let waiting = outstanding(&table);
            let garments: u64 = waiting.iter().map(|record| record.outstanding()).sum();
            Ok((summarize_day(&table, date), waiting.len(), garments))
        })?;

        let mut response = format_daily_summary(&day)?;
        write!(
            &mut response,
            "\n🧺 Still in the shop overall: {garments_waiting} garments across {records_waiting} records"
        )?;
        ctx.say(response).await?;
        Ok(())
    }

    /// Sends the whole table as a CSV file.
    #[poise::command(slash_command, prefix_command)]
    pub async fn export(ctx: Context<'_>) -> Result<()> {
        let (bytes, count) = ctx.data().with_store(|store| {
            let table = store.load()?;
            Ok((export_table(&table)?, table.len()))
        })?;

        let reply = poise::CreateReply::default()
            .content(format!("📊 Exported {count} records."))
            .attachment(serenity::CreateAttachment::bytes(bytes, "clothes_data.csv"));
        ctx.send(reply).await?;
        Ok(())
    }

    /// Deletes records by id, e.g. `3, 5, 8`.
    #[poise::command(slash_command, prefix_command)]
    pub async fn delete(
        ctx: Context<'_>,
        #[description = "Record ids separated by commas or spaces"] ids: String,
    ) -> Result<()> {
        let ids = parse_record_ids(&ids)?;
        let outcome = ctx.data().with_store(|store| request_delete(store, &ids))?;

        let mut response = String::new();
        if outcome.removed.is_empty() {
            write!(&mut response, "ℹ️ No records deleted.")?;
        } else {
            write!(&mut response, "✅ Deleted {} record(s):", outcome.removed.len())?;
            for id in &outcome.removed {
                write!(&mut response, " `#{id}`")?;
            }
        }
        if !outcome.ignored.is_empty() {
            write!(&mut response, "\nℹ️ Not found:")?;
            for id in &outcome.ignored {
                write!(&mut response, " `#{id}`")?;
            }
        }
        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

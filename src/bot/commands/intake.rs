//! Intake Discord command - taking garments in at the counter.
//!
//! Counts arrive as signed integers so a negative entry reaches the core validator
//! and is answered with a field-specific message instead of a Discord-side error.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        core::{
            fields::{parse_date_input, parse_time_input},
            intake::{IntakeForm, submit_intake},
            report::{format_counts, format_time},
        },
        entities::Category,
        errors::Result,
    };

    /// Records a batch of garments taken in.
    ///
    /// Date and time default to now. Categories left blank count zero.
    #[poise::command(slash_command, prefix_command)]
    #[allow(clippy::too_many_arguments)]
    pub async fn intake(
        ctx: Context<'_>,
        #[description = "Customer or drop-off name"] name: String,
        #[description = "Shirts"] shirts: Option<i64>,
        #[description = "Pants"] pants: Option<i64>,
        #[description = "T-shirts"] t_shirts: Option<i64>,
        #[description = "Sarees"] sarees: Option<i64>,
        #[description = "Dresses"] dresses: Option<i64>,
        #[description = "Dry clean shirts"] dry_clean_shirts: Option<i64>,
        #[description = "Others"] others: Option<i64>,
        #[description = "Intake date (YYYY-MM-DD), default today"] date: Option<String>,
        #[description = "Intake time (e.g. 14:30 or 2:30 PM), default now"] time: Option<String>,
    ) -> Result<()> {
        let counts = [
            (Category::Shirts, shirts),
            (Category::Pants, pants),
            (Category::TShirts, t_shirts),
            (Category::Sarees, sarees),
            (Category::Dresses, dresses),
            (Category::DryCleanShirts, dry_clean_shirts),
            (Category::Others, others),
        ]
        .into_iter()
        .filter_map(|(category, value)| value.map(|v| (category, v)))
        .collect();

        let form = IntakeForm {
            name,
            date: date.as_deref().map(|d| parse_date_input("Date", d)).transpose()?,
            time: time.as_deref().map(|t| parse_time_input("Time", t)).transpose()?,
            counts,
        };

        let clock = ctx.data().settings.display.clock;
        let record = ctx.data().with_store(|store| submit_intake(store, form))?;

        ctx.say(format!(
            "✅ Recorded `#{}` for **{}** on {} at {}: {} garments ({})",
            record.id,
            record.name,
            record.date,
            format_time(record.time, clock),
            record.total_clothes(),
            format_counts(&record.intake)
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

//! Update Discord commands - payment status, returns, and single-field corrections.
//!
//! Each command validates everything it was given before the store is touched, so a
//! rejected value leaves the record exactly as it was.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, handlers::autocomplete},
        core::{
            fields::parse_date_input,
            records::{
                ReturnUpdate, parse_record_id, request_field_edit, request_update,
                set_payment_status, set_payment_status_for_date,
            },
            report::format_record_detail,
        },
        entities::{Category, PaymentStatus},
        errors::Result,
    };
    use chrono::Local;

    /// Marks one record Paid or Pending.
    #[poise::command(slash_command, prefix_command)]
    pub async fn payment(
        ctx: Context<'_>,
        #[description = "Record id, e.g. 7"] id: String,
        #[description = "Pending or Paid"]
        #[autocomplete = "autocomplete::autocomplete_payment_status"]
        status: String,
    ) -> Result<()> {
        let id = parse_record_id(&id)?;
        let status: PaymentStatus = status.parse()?;

        let record = ctx
            .data()
            .with_store(|store| set_payment_status(store, id, status))?;

        ctx.say(format!(
            "✅ `#{}` ({}) is now {}",
            record.id, record.name, record.payment_status
        ))
        .await?;
        Ok(())
    }

    /// Sets the payment status of every record taken in on one day.
    #[poise::command(slash_command, prefix_command)]
    pub async fn payment_by_date(
        ctx: Context<'_>,
        #[description = "Intake date (YYYY-MM-DD)"] date: String,
        #[description = "Pending or Paid"]
        #[autocomplete = "autocomplete::autocomplete_payment_status"]
        status: String,
    ) -> Result<()> {
        let date = parse_date_input("Date", &date)?;
        let status: PaymentStatus = status.parse()?;

        let outcome = ctx
            .data()
            .with_store(|store| set_payment_status_for_date(store, date, status))?;

        if outcome.is_noop() {
            ctx.say(format!("ℹ️ No records on {date}; nothing changed."))
                .await?;
        } else {
            ctx.say(format!(
                "✅ Marked {} record(s) from {date} as {status}",
                outcome.affected
            ))
            .await?;
        }
        Ok(())
    }

    /// Records garments handed back to the customer.
    ///
    /// The received date defaults to today. Categories left blank keep their
    /// current received count.
    #[poise::command(slash_command, prefix_command)]
    #[allow(clippy::too_many_arguments)]
    pub async fn receive(
        ctx: Context<'_>,
        #[description = "Record id, e.g. 7"] id: String,
        #[description = "Who collected the garments"]
        #[autocomplete = "autocomplete::autocomplete_staff"]
        received_by: String,
        #[description = "Date handed back (YYYY-MM-DD), default today"]
        received_date: Option<String>,
        #[description = "Shirts handed back"] shirts: Option<i64>,
        #[description = "Pants handed back"] pants: Option<i64>,
        #[description = "T-shirts handed back"] t_shirts: Option<i64>,
        #[description = "Sarees handed back"] sarees: Option<i64>,
        #[description = "Dresses handed back"] dresses: Option<i64>,
        #[description = "Dry clean shirts handed back"] dry_clean_shirts: Option<i64>,
        #[description = "Others handed back"] others: Option<i64>,
        #[description = "Payment status"]
        #[autocomplete = "autocomplete::autocomplete_payment_status"]
        status: Option<String>,
    ) -> Result<()> {
        let id = parse_record_id(&id)?;
        let received_date = received_date
            .as_deref()
            .map(|d| parse_date_input("Received_Date", d))
            .transpose()?
            .unwrap_or_else(|| Local::now().date_naive());
        let payment_status = status
            .as_deref()
            .map(str::parse::<PaymentStatus>)
            .transpose()?;

        let received = [
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

        let update = ReturnUpdate {
            payment_status,
            received_by: Some(received_by),
            received_date: Some(received_date),
            received,
        };

        let clock = ctx.data().settings.display.clock;
        let record = ctx
            .data()
            .with_store(|store| request_update(store, id, update))?;

        ctx.say(format!("✅ Return recorded\n{}", format_record_detail(&record, clock)?))
            .await?;
        Ok(())
    }

    /// Corrects one column of one record, e.g. `Name` or `Sarees`.
    ///
    /// Totals are always recomputed and cannot be edited.
    #[poise::command(slash_command, prefix_command)]
    pub async fn edit(
        ctx: Context<'_>,
        #[description = "Record id, e.g. 7"] id: String,
        #[description = "Column to change"]
        #[autocomplete = "autocomplete::autocomplete_field_name"]
        field: String,
        #[description = "New value (blank text clears Received_By or Received_Date)"] value: String,
    ) -> Result<()> {
        let id = parse_record_id(&id)?;
        let clock = ctx.data().settings.display.clock;

        let record = ctx
            .data()
            .with_store(|store| request_field_edit(store, id, &field, &value))?;

        ctx.say(format!("✅ Updated {field}\n{}", format_record_detail(&record, clock)?))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

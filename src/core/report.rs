//! Report generation business logic.
//!
//! Read-only projections of the ledger for display: one-line record summaries,
//! day totals, and the list of records with garments still in the shop. All
//! functions are framework-agnostic and return plain strings or structs that the
//! bot layer sends as-is.

use crate::{
    config::settings::Clock,
    core::store::Table,
    entities::{CategoryCounts, PaymentStatus, Record},
    errors::Result,
};
use chrono::{NaiveDate, NaiveTime};
use std::fmt::Write;

/// Totals for one intake date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySummary {
    /// The day summarised
    pub date: NaiveDate,
    /// Records taken in that day
    pub records: usize,
    /// Garments taken in
    pub garments_in: u64,
    /// Garments handed back so far
    pub garments_received: u64,
    /// Records not yet paid
    pub pending_payments: usize,
}

/// Summarises the records taken in on `date`.
#[must_use]
pub fn summarize_day(table: &Table, date: NaiveDate) -> DailySummary {
    table.on_date(date).fold(
        DailySummary {
            date,
            records: 0,
            garments_in: 0,
            garments_received: 0,
            pending_payments: 0,
        },
        |mut summary, record| {
            summary.records += 1;
            summary.garments_in += record.total_clothes();
            summary.garments_received += record.total_received();
            if !record.is_paid() {
                summary.pending_payments += 1;
            }
            summary
        },
    )
}

/// Records that still have garments in the shop, oldest first.
#[must_use]
pub fn outstanding(table: &Table) -> Vec<&Record> {
    let mut records: Vec<&Record> = table
        .records()
        .iter()
        .filter(|record| record.outstanding() > 0)
        .collect();
    records.sort_by_key(|record| (record.date, record.time));
    records
}

/// Formats a time of day for display.
#[must_use]
pub fn format_time(time: NaiveTime, clock: Clock) -> String {
    match clock {
        Clock::TwelveHour => time.format("%I:%M %p").to_string(),
        Clock::TwentyFourHour => time.format("%H:%M").to_string(),
    }
}

/// Formats the non-zero counts like `Shirts 2, Pants 1`, or `none`.
#[must_use]
pub fn format_counts(counts: &CategoryCounts) -> String {
    let parts: Vec<String> = counts
        .non_zero()
        .map(|(category, count)| format!("{} {count}", category.label()))
        .collect();

    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}

const fn status_badge(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "⏳ Pending",
        PaymentStatus::Paid => "✅ Paid",
    }
}

/// One line per record, e.g.
/// `` `#3` **Asha** · 2024-01-01 10:30 AM · 3 in (Shirts 2, Pants 1) · 0/3 back · ⏳ Pending``
#[must_use]
pub fn format_record_line(record: &Record, clock: Clock) -> String {
    format!(
        "`#{}` **{}** · {} {} · {} in ({}) · {}/{} back · {}",
        record.id,
        if record.name.is_empty() { "(no name)" } else { &record.name },
        record.date,
        format_time(record.time, clock),
        record.total_clothes(),
        format_counts(&record.intake),
        record.total_received(),
        record.total_clothes(),
        status_badge(record.payment_status)
    )
}

/// Full detail of one record, including its receipt.
///
/// # Errors
/// Returns an error if string formatting fails.
pub fn format_record_detail(record: &Record, clock: Clock) -> Result<String> {
    let mut out = String::new();
    writeln!(&mut out, "{}", format_record_line(record, clock))?;
    if record.receipt.is_recorded() {
        let by = if record.receipt.received_by.is_empty() {
            "unknown"
        } else {
            &record.receipt.received_by
        };
        let on = record
            .receipt
            .received_date
            .map_or_else(|| "undated".to_string(), |date| date.to_string());
        writeln!(
            &mut out,
            "↩️ Received by {by} on {on}: {}",
            format_counts(&record.receipt.counts)
        )?;
    }
    if record.outstanding() > 0 {
        writeln!(&mut out, "🧺 {} still in the shop", record.outstanding())?;
    }
    Ok(out)
}

/// Renders up to `limit` records, one per line, noting how many were left out.
///
/// # Errors
/// Returns an error if string formatting fails.
pub fn render_records<'a, I>(records: I, clock: Clock, limit: usize) -> Result<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut out = String::new();
    let mut hidden = 0usize;
    for (shown, record) in records.into_iter().enumerate() {
        if shown < limit {
            writeln!(&mut out, "{}", format_record_line(record, clock))?;
        } else {
            hidden += 1;
        }
    }
    if hidden > 0 {
        writeln!(&mut out, "_…and {hidden} more. Use `/export` for the full table._")?;
    }
    Ok(out)
}

/// Formats a [`DailySummary`] as a short block.
///
/// # Errors
/// Returns an error if string formatting fails.
pub fn format_daily_summary(summary: &DailySummary) -> Result<String> {
    let mut out = format!("📅 **{}**\n", summary.date);
    writeln!(&mut out, "Records: {}", summary.records)?;
    writeln!(
        &mut out,
        "Garments in: {} | handed back: {}",
        summary.garments_in, summary.garments_received
    )?;
    write!(&mut out, "Pending payments: {}", summary.pending_payments)?;
    Ok(out)
}

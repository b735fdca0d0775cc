//! Intake business logic - Taking garments in at the counter.
//!
//! An intake form carries the customer name, optional date and time (defaulting to
//! the current local clock), and a count per category. Counts are validated before
//! anything is written; a valid form becomes one new record with an empty receipt
//! and a `Pending` payment status.

use crate::{
    core::{
        fields::validate_count,
        schema::{canonical_time, default_record},
        store::RecordStore,
    },
    entities::{Category, CategoryCounts, Record},
    errors::Result,
};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::info;

/// Raw values entered for a new intake.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntakeForm {
    /// Customer / drop-off name
    pub name: String,
    /// Intake date; today when `None`
    pub date: Option<NaiveDate>,
    /// Intake time; now when `None`
    pub time: Option<NaiveTime>,
    /// Count per category as entered; categories left out count zero
    pub counts: Vec<(Category, i64)>,
}

/// Validates a form and merges it over [`default_record`].
///
/// `now` supplies the date and time the form leaves blank. The returned record's id
/// is a placeholder until it is appended.
///
/// # Errors
/// `Validation` when any count is negative or too large.
pub fn build_record(form: IntakeForm, now: NaiveDateTime) -> Result<Record> {
    let mut intake = CategoryCounts::new();
    for (category, value) in &form.counts {
        intake.set(*category, validate_count(category.column(), *value)?);
    }

    Ok(Record {
        name: form.name.trim().to_string(),
        date: form.date.unwrap_or_else(|| now.date()),
        time: canonical_time(form.time.unwrap_or_else(|| now.time())),
        intake,
        ..default_record()
    })
}

/// Validates, appends and saves a new intake record.
///
/// Returns the stored record with its assigned id.
///
/// # Errors
/// `Validation` for bad counts (nothing is written), or any storage error.
pub fn submit_intake(store: &RecordStore, form: IntakeForm) -> Result<Record> {
    let record = build_record(form, Local::now().naive_local())?;

    let stored = store.transact(|table| {
        let id = table.append(record.clone())?;
        Ok(Record { id, ..record })
    })?;

    info!(
        "Intake #{} for '{}': {} garments",
        stored.id,
        stored.name,
        stored.total_clothes()
    );
    Ok(stored)
}

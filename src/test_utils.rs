//! Shared test utilities for the ironing tracker.
//!
//! This module provides helpers for setting up throwaway ledger files and creating
//! test records with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        intake::{self, IntakeForm},
        store::RecordStore,
    },
    entities::{Category, CategoryCounts, Record},
    errors::Result,
};
use chrono::{NaiveDate, NaiveTime};
use tempfile::TempDir;

/// Creates a store backed by a file inside a fresh temporary directory.
/// The file does not exist yet. Keep the `TempDir` alive for the duration of the test.
pub fn setup_test_store() -> Result<(TempDir, RecordStore)> {
    let dir = tempfile::tempdir()?;
    let store = RecordStore::new(dir.path().join("clothes_data.csv"));
    Ok((dir, store))
}

/// 2024-01-01, the date most tests file records under.
#[must_use]
pub fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// 10:30, the intake time most tests use.
#[must_use]
pub fn sample_time() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 30, 0).unwrap()
}

/// Two shirts and one pair of pants.
#[must_use]
pub fn sample_counts() -> CategoryCounts {
    CategoryCounts::new()
        .with(Category::Shirts, 2)
        .with(Category::Pants, 1)
}

/// Builds an intake form dated `date` at [`sample_time`].
#[must_use]
pub fn intake_form(name: &str, date: NaiveDate, counts: &[(Category, i64)]) -> IntakeForm {
    IntakeForm {
        name: name.to_string(),
        date: Some(date),
        time: Some(sample_time()),
        counts: counts.to_vec(),
    }
}

/// Submits an intake through the public operation and returns the stored record.
///
/// # Defaults
/// * `date`: [`sample_date`]
/// * `time`: [`sample_time`]
pub fn create_test_record(
    store: &RecordStore,
    name: &str,
    counts: &[(Category, i64)],
) -> Result<Record> {
    intake::submit_intake(store, intake_form(name, sample_date(), counts))
}

/// Sets up a store holding one record for "Asha" (2 shirts, 1 pants).
/// Returns (dir, store, record) for update and delete tests.
pub fn setup_with_record() -> Result<(TempDir, RecordStore, Record)> {
    let (dir, store) = setup_test_store()?;
    let record = create_test_record(
        &store,
        "Asha",
        &[(Category::Shirts, 2), (Category::Pants, 1)],
    )?;
    Ok((dir, store, record))
}

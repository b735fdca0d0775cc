//! Record maintenance - Deleting, updating and viewing existing records.
//!
//! These are the operations behind the management screens: look up the records for
//! a day, mark payments, record what went back to the customer, fix a field, and
//! remove rows. Every mutating call is one load → mutate → save cycle on the store,
//! addressed by stable [`RecordId`]s rather than display positions.

use crate::{
    core::{
        fields::{FieldUpdate, validate_count},
        store::RecordStore,
    },
    entities::{Category, PaymentStatus, Record, RecordId},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Result of a delete request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Ids that were present and are now gone
    pub removed: Vec<RecordId>,
    /// Ids that were not in the table
    pub ignored: Vec<RecordId>,
}

/// Result of a bulk update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Number of records the update touched
    pub affected: usize,
}

impl UpdateOutcome {
    /// Whether nothing matched.
    #[must_use]
    pub const fn is_noop(self) -> bool {
        self.affected == 0
    }
}

/// Editable fields of one record, as submitted from the update screen.
///
/// `None` leaves a field as it is. Received counts are raw so they can be
/// validated together before anything is written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReturnUpdate {
    /// New payment status
    pub payment_status: Option<PaymentStatus>,
    /// Who collected the garments
    pub received_by: Option<String>,
    /// When they were collected
    pub received_date: Option<NaiveDate>,
    /// Received count per category
    pub received: Vec<(Category, i64)>,
}

impl ReturnUpdate {
    /// Validates the submission into field updates.
    ///
    /// # Errors
    /// `Validation` if any received count is negative or too large.
    pub fn into_field_updates(self) -> Result<Vec<FieldUpdate>> {
        let mut updates = Vec::new();
        if let Some(status) = self.payment_status {
            updates.push(FieldUpdate::PaymentStatus(status));
        }
        if let Some(name) = self.received_by {
            updates.push(FieldUpdate::ReceivedBy(name.trim().to_string()));
        }
        if let Some(date) = self.received_date {
            updates.push(FieldUpdate::ReceivedDate(Some(date)));
        }
        for (category, value) in self.received {
            let count = validate_count(category.received_column(), value)?;
            updates.push(FieldUpdate::ReceivedCount(category, count));
        }
        Ok(updates)
    }
}

/// Parses one record id typed as `7` or `#7`.
///
/// # Errors
/// `Validation` when the text is not an id.
pub fn parse_record_id(raw: &str) -> Result<RecordId> {
    raw.parse::<RecordId>()
        .map_err(|_| Error::validation("Id", format!("'{}' is not a record id", raw.trim())))
}

/// Splits text like `3, 5 #8` into record ids.
///
/// # Errors
/// `Validation` when a token is not an id or the text holds none.
pub fn parse_record_ids(raw: &str) -> Result<Vec<RecordId>> {
    let ids = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(parse_record_id)
        .collect::<Result<Vec<_>>>()?;

    if ids.is_empty() {
        return Err(Error::validation("Id", "no record ids given"));
    }
    Ok(ids)
}

/// All records taken in on `date`.
///
/// # Errors
/// Returns an error if the store cannot be loaded.
pub fn request_filtered_view(store: &RecordStore, date: NaiveDate) -> Result<Vec<Record>> {
    Ok(store.load()?.on_date(date).cloned().collect())
}

/// Removes the given records. Ids not in the table are reported, not treated as errors.
///
/// # Errors
/// Returns an error if the store cannot be loaded or saved.
pub fn request_delete(store: &RecordStore, ids: &[RecordId]) -> Result<DeleteOutcome> {
    let removed = store.transact(|table| Ok(table.delete(ids)))?;
    let ignored: Vec<RecordId> = ids
        .iter()
        .filter(|id| !removed.contains(id))
        .copied()
        .collect();

    if !ignored.is_empty() {
        warn!("Delete ignored unknown ids {ignored:?}");
    }
    info!("Deleted records {removed:?}");
    Ok(DeleteOutcome { removed, ignored })
}

/// Applies an update-screen submission to one record.
///
/// All values are validated before the store is touched, so the record changes
/// completely or not at all.
///
/// # Errors
/// `Validation` for bad counts, `IdentityNotFound` for an unknown id.
pub fn request_update(store: &RecordStore, id: RecordId, update: ReturnUpdate) -> Result<Record> {
    let updates = update.into_field_updates()?;
    apply_updates(store, id, &updates)
}

/// Sets one field of one record from its column name and raw text.
///
/// # Errors
/// `Validation` for unknown, derived or unparseable input, `IdentityNotFound` for
/// an unknown id.
pub fn request_field_edit(
    store: &RecordStore,
    id: RecordId,
    field: &str,
    raw_value: &str,
) -> Result<Record> {
    let update = FieldUpdate::parse(field, raw_value)?;
    apply_updates(store, id, std::slice::from_ref(&update))
}

/// Sets the payment status of one record.
///
/// # Errors
/// `IdentityNotFound` for an unknown id.
pub fn set_payment_status(
    store: &RecordStore,
    id: RecordId,
    status: PaymentStatus,
) -> Result<Record> {
    apply_updates(store, id, &[FieldUpdate::PaymentStatus(status)])
}

/// Sets the payment status of every record taken in on `date`.
///
/// Zero matching records is a no-op; the file is still rewritten unchanged.
///
/// # Errors
/// Returns an error if the store cannot be loaded or saved.
pub fn set_payment_status_for_date(
    store: &RecordStore,
    date: NaiveDate,
    status: PaymentStatus,
) -> Result<UpdateOutcome> {
    let update = FieldUpdate::PaymentStatus(status);
    let affected = store.transact(|table| {
        Ok(table.update_by_predicate(|record| record.date == date, &update))
    })?;

    info!("Payment status set to {status} for {affected} records on {date}");
    Ok(UpdateOutcome { affected })
}

fn apply_updates(store: &RecordStore, id: RecordId, updates: &[FieldUpdate]) -> Result<Record> {
    let record = store.transact(|table| {
        if table.get(id).is_none() {
            return Err(Error::IdentityNotFound { id });
        }
        let mut current = None;
        for update in updates {
            current = Some(table.update_field(id, update)?.clone());
        }
        current
            .or_else(|| table.get(id).cloned())
            .ok_or(Error::IdentityNotFound { id })
    })?;

    info!(
        "Updated record #{id}: {} field(s), {}/{} received",
        updates.len(),
        record.total_received(),
        record.total_clothes()
    );
    Ok(record)
}

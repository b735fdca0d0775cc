//! Schema and aggregation policy.
//!
//! The ledger file has been through several revisions: the first sheet had no
//! `Others` column, the second added it, the third added the return columns and the
//! current one adds a stable `Id`. This module owns the column list, the derived
//! totals and the single migration step that lifts any older table to the current
//! layout when it is loaded.

use crate::{
    core::store::Table,
    entities::{Category, CategoryCounts, PaymentStatus, Record, RecordId},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime, Timelike};
use std::{collections::HashSet, fmt, path::PathBuf};
use tracing::{info, warn};

/// Persisted date format (ISO 8601).
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Persisted time format (24-hour, minute precision).
pub const TIME_FORMAT: &str = "%H:%M";
/// Time formats accepted when reading cells written by any revision.
const TIME_INPUT_FORMATS: [&str; 4] = ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M:%S %p"];

/// Sums a set of category counts.
///
/// This is the only place a derived total is computed: `Total_Clothes` from the
/// intake counts and `Total_Clothes_Received` from the return counts. Categories a
/// schema revision did not have are stored as zero and contribute nothing.
#[must_use]
pub fn compute_total(counts: &CategoryCounts) -> u64 {
    counts.iter().map(|(_, count)| u64::from(count)).sum()
}

/// A record with every field at its default.
///
/// Counts are zero, the payment status is `Pending` and the receipt is empty. New
/// intake starts from this value, and the back-fill cells for columns an older
/// table lacks are rendered from it.
#[must_use]
pub fn default_record() -> Record {
    Record {
        id: RecordId::default(),
        name: String::new(),
        date: NaiveDate::default(),
        time: NaiveTime::MIN,
        intake: CategoryCounts::new(),
        payment_status: PaymentStatus::default(),
        receipt: crate::entities::Receipt::default(),
    }
}

/// Truncates a time of day to minute precision.
#[must_use]
pub fn canonical_time(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Revisions of the persisted layout, oldest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaVersion {
    /// Intake counts without `Others`, total, free-text payment status
    V1,
    /// Adds `Others`
    V2,
    /// Adds the return columns and their total
    V3,
    /// Adds the stable `Id` column
    V4,
}

impl SchemaVersion {
    /// The layout `save` writes.
    pub const CURRENT: Self = Self::V4;

    const ALL: [Self; 4] = [Self::V1, Self::V2, Self::V3, Self::V4];

    /// Newest revision whose columns are all present in `headers`.
    ///
    /// Returns `None` when even the first revision's columns are incomplete.
    #[must_use]
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Option<Self> {
        let present = |column: Column| {
            headers
                .iter()
                .any(|header| header.as_ref().trim().eq_ignore_ascii_case(column.name()))
        };

        Self::ALL.into_iter().take_while(|version| {
            Column::current()
                .into_iter()
                .filter(|column| column.introduced_in() <= *version)
                .all(present)
        })
        .last()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V4 => 4,
        };
        write!(f, "v{number}")
    }
}

/// A persisted column of the current layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    /// `Id`
    Id,
    /// `Name`
    Name,
    /// `Date`
    Date,
    /// `Time`
    Time,
    /// Intake count of one category
    Count(Category),
    /// `Total_Clothes` (derived)
    TotalClothes,
    /// `Payment_Status`
    PaymentStatus,
    /// `Received_By`
    ReceivedBy,
    /// `Received_Date`
    ReceivedDate,
    /// Return count of one category
    Received(Category),
    /// `Total_Clothes_Received` (derived)
    TotalReceived,
}

impl Column {
    /// Columns of [`SchemaVersion::CURRENT`] in persisted order.
    #[must_use]
    pub fn current() -> Vec<Self> {
        let mut columns = vec![Self::Id, Self::Name, Self::Date, Self::Time];
        columns.extend(Category::ALL.into_iter().map(Self::Count));
        columns.extend([
            Self::TotalClothes,
            Self::PaymentStatus,
            Self::ReceivedBy,
            Self::ReceivedDate,
        ]);
        columns.extend(Category::ALL.into_iter().map(Self::Received));
        columns.push(Self::TotalReceived);
        columns
    }

    /// Header text.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "Id",
            Self::Name => "Name",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Count(category) => category.column(),
            Self::TotalClothes => "Total_Clothes",
            Self::PaymentStatus => "Payment_Status",
            Self::ReceivedBy => "Received_By",
            Self::ReceivedDate => "Received_Date",
            Self::Received(category) => category.received_column(),
            Self::TotalReceived => "Total_Clothes_Received",
        }
    }

    /// Finds a column by header text, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::current()
            .into_iter()
            .find(|column| column.name().eq_ignore_ascii_case(name))
    }

    /// Revision that added the column.
    #[must_use]
    pub const fn introduced_in(self) -> SchemaVersion {
        match self {
            Self::Id => SchemaVersion::V4,
            Self::Count(Category::Others) => SchemaVersion::V2,
            Self::ReceivedBy | Self::ReceivedDate | Self::Received(_) | Self::TotalReceived => {
                SchemaVersion::V3
            }
            Self::Name
            | Self::Date
            | Self::Time
            | Self::Count(_)
            | Self::TotalClothes
            | Self::PaymentStatus => SchemaVersion::V1,
        }
    }

    /// Columns every revision has and that have no meaningful default.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Name | Self::Date | Self::Time)
    }

    /// Columns recomputed from other columns.
    #[must_use]
    pub const fn is_derived(self) -> bool {
        matches!(self, Self::TotalClothes | Self::TotalReceived)
    }

    /// Cell written for this column when a stored row lacks it.
    ///
    /// `None` for `Id` (assigned during normalisation) and for required columns.
    #[must_use]
    pub fn default_cell(self) -> Option<String> {
        if self == Self::Id || self.is_required() {
            return None;
        }
        Some(render_cell(&default_record(), self))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Renders one cell of a record in persisted form.
#[must_use]
pub fn render_cell(record: &Record, column: Column) -> String {
    match column {
        Column::Id => record.id.to_string(),
        Column::Name => record.name.clone(),
        Column::Date => record.date.format(DATE_FORMAT).to_string(),
        Column::Time => record.time.format(TIME_FORMAT).to_string(),
        Column::Count(category) => record.intake.get(category).to_string(),
        Column::TotalClothes => record.total_clothes().to_string(),
        Column::PaymentStatus => record.payment_status.as_str().to_string(),
        Column::ReceivedBy => record.receipt.received_by.clone(),
        Column::ReceivedDate => record
            .receipt
            .received_date
            .map(|date| date.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        Column::Received(category) => record.receipt.counts.get(category).to_string(),
        Column::TotalReceived => record.total_received().to_string(),
    }
}

/// Reads a whole number from a stored cell.
///
/// Blank cells read as `None`. Dataframe tools write integer columns holding blanks
/// as floats, so `"3.0"` is accepted; fractional or negative values are not.
// Cast safety: the float branch only casts finite, non-negative integral values below 2^53.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::float_cmp)]
pub(crate) fn parse_whole_number(raw: &str) -> std::result::Result<Option<u64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(value) = raw.parse::<u64>() {
        return Ok(Some(value));
    }
    match raw.parse::<f64>() {
        Ok(value)
            if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < 9.0e15 =>
        {
            Ok(Some(value as u64))
        }
        _ => Err(format!("'{raw}' is not a non-negative whole number")),
    }
}

fn parse_count_cell(raw: &str) -> std::result::Result<u32, String> {
    parse_whole_number(raw)?
        .map_or(Ok(0), |value| {
            u32::try_from(value).map_err(|_| format!("count {value} is too large"))
        })
}

/// Parses a time of day in any accepted format, truncated to minutes.
pub(crate) fn parse_time_cell(raw: &str) -> std::result::Result<NaiveTime, String> {
    let raw = raw.trim();
    TIME_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .map(canonical_time)
        .ok_or_else(|| format!("'{raw}' is not a time of day"))
}

pub(crate) fn parse_date_cell(raw: &str) -> std::result::Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| format!("'{raw}' is not a YYYY-MM-DD date"))
}

/// Writes one stored cell into `record`. Derived and `Id` columns are ignored here.
fn read_cell(record: &mut Record, column: Column, raw: &str) -> std::result::Result<(), String> {
    match column {
        Column::Id | Column::TotalClothes | Column::TotalReceived => {}
        Column::Name => record.name = raw.to_string(),
        Column::Date => record.date = parse_date_cell(raw)?,
        Column::Time => record.time = parse_time_cell(raw)?,
        Column::Count(category) => record.intake.set(category, parse_count_cell(raw)?),
        Column::PaymentStatus => {
            let (status, recognised) = PaymentStatus::from_legacy(raw);
            if !recognised {
                warn!("Unrecognised payment status '{raw}' read as {status}");
            }
            record.payment_status = status;
        }
        Column::ReceivedBy => record.receipt.received_by = raw.to_string(),
        Column::ReceivedDate => {
            record.receipt.received_date = if raw.trim().is_empty() {
                None
            } else {
                Some(parse_date_cell(raw)?)
            };
        }
        Column::Received(category) => record.receipt.counts.set(category, parse_count_cell(raw)?),
    }
    Ok(())
}

/// A table as found in the medium: headers and rows of text, any revision.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Where the text came from, for error reporting
    pub source: PathBuf,
    /// Header row
    pub headers: Vec<String>,
    /// Data rows
    pub rows: Vec<Vec<String>>,
}

/// Lifts a table of any revision to the current layout.
///
/// Missing columns are filled from [`default_record`], rows without an `Id` get one
/// past the largest id present (in row order), and stored totals are replaced by
/// recomputed ones. Unknown columns are dropped.
///
/// # Errors
/// `StorageUnavailable` when a required column is missing, a cell cannot be read,
/// or two rows share an id.
pub fn normalize_schema(raw: RawTable) -> Result<Table> {
    let unavailable = |message: String| Error::StorageUnavailable {
        path: raw.source.clone(),
        message,
    };

    let columns = Column::current();
    let positions: Vec<Option<usize>> = columns
        .iter()
        .map(|column| {
            raw.headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(column.name()))
        })
        .collect();

    if let Some((column, _)) = columns
        .iter()
        .zip(&positions)
        .find(|(column, position)| column.is_required() && position.is_none())
    {
        return Err(unavailable(format!("missing required column '{column}'")));
    }

    match SchemaVersion::detect(&raw.headers) {
        Some(version) if version < SchemaVersion::CURRENT => {
            info!(
                "Migrating {} rows from schema {version} to {}",
                raw.rows.len(),
                SchemaVersion::CURRENT
            );
        }
        Some(_) => {}
        None => warn!("Table has a partial column set; filling defaults"),
    }

    let defaults: Vec<Option<String>> = columns.iter().map(|column| column.default_cell()).collect();
    let mut parsed: Vec<(Option<u64>, Record)> = Vec::with_capacity(raw.rows.len());

    for (row_number, row) in raw.rows.iter().enumerate() {
        let mut record = default_record();
        let mut stored_id = None;
        let mut stored_totals = (None, None);

        for ((column, position), default) in columns.iter().zip(&positions).zip(&defaults) {
            let cell = match position {
                Some(index) => row.get(*index).map_or("", String::as_str),
                None => default.as_deref().unwrap_or(""),
            };
            let located = |message: String| {
                unavailable(format!("row {}, column '{column}': {message}", row_number + 1))
            };

            match column {
                Column::Id => stored_id = parse_whole_number(cell).map_err(located)?,
                Column::TotalClothes if position.is_some() => {
                    stored_totals.0 = parse_whole_number(cell).map_err(located)?;
                }
                Column::TotalReceived if position.is_some() => {
                    stored_totals.1 = parse_whole_number(cell).map_err(located)?;
                }
                _ => read_cell(&mut record, *column, cell).map_err(located)?,
            }
        }

        if let Some(stored) = stored_totals.0.filter(|total| *total != record.total_clothes()) {
            warn!(
                "Row {}: stored Total_Clothes {stored} corrected to {}",
                row_number + 1,
                record.total_clothes()
            );
        }
        if let Some(stored) = stored_totals.1.filter(|total| *total != record.total_received()) {
            warn!(
                "Row {}: stored Total_Clothes_Received {stored} corrected to {}",
                row_number + 1,
                record.total_received()
            );
        }

        parsed.push((stored_id, record));
    }

    let mut next_id = parsed
        .iter()
        .filter_map(|(id, _)| *id)
        .max()
        .map_or(Some(RecordId(0)), |max| RecordId(max).checked_next());
    let mut records = Vec::with_capacity(parsed.len());
    for (stored_id, mut record) in parsed {
        record.id = match stored_id {
            Some(id) => RecordId(id),
            None => {
                let assigned = next_id
                    .ok_or_else(|| unavailable("no record ids left to assign".to_string()))?;
                next_id = assigned.checked_next();
                assigned
            }
        };
        records.push(record);
    }

    let mut seen = HashSet::new();
    if let Some(record) = records.iter().find(|record| !seen.insert(record.id)) {
        return Err(unavailable(format!("duplicate id {}", record.id)));
    }

    Ok(Table::from_records(records))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            source: PathBuf::from("test.csv"),
            headers: headers.iter().map(ToString::to_string).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect(),
        }
    }

    const V1_HEADERS: [&str; 11] = [
        "Name",
        "Date",
        "Time",
        "Shirts",
        "Pants",
        "T-shirts",
        "Sarees",
        "Dresses",
        "Dry_clean_shirts",
        "Total_Clothes",
        "Payment_Status",
    ];

    #[test]
    fn test_compute_total_sums_every_category() {
        let counts = CategoryCounts::new()
            .with(Category::Shirts, 3)
            .with(Category::Pants, 2)
            .with(Category::Others, 4);
        assert_eq!(compute_total(&counts), 9);
        assert_eq!(compute_total(&CategoryCounts::new()), 0);
    }

    #[test]
    fn test_compute_total_does_not_overflow_u32() {
        let counts: CategoryCounts = Category::ALL.into_iter().map(|c| (c, u32::MAX)).collect();
        assert_eq!(compute_total(&counts), u64::from(u32::MAX) * 7);
    }

    #[test]
    fn test_default_record() {
        let record = default_record();
        assert!(record.intake.is_empty());
        assert_eq!(record.payment_status, PaymentStatus::Pending);
        assert_eq!(record.receipt.received_by, "");
        assert_eq!(record.receipt.received_date, None);
        assert_eq!(record.total_received(), 0);
    }

    #[test]
    fn test_current_columns_layout() {
        let names: Vec<&str> = Column::current().into_iter().map(Column::name).collect();
        assert_eq!(names.len(), 23);
        assert_eq!(names[0], "Id");
        assert_eq!(names[10], "Others");
        assert_eq!(names[11], "Total_Clothes");
        assert_eq!(names[22], "Total_Clothes_Received");
    }

    #[test]
    fn test_default_cells() {
        assert_eq!(Column::Count(Category::Others).default_cell().as_deref(), Some("0"));
        assert_eq!(Column::PaymentStatus.default_cell().as_deref(), Some("Pending"));
        assert_eq!(Column::ReceivedBy.default_cell().as_deref(), Some(""));
        assert_eq!(Column::ReceivedDate.default_cell().as_deref(), Some(""));
        assert_eq!(Column::Name.default_cell(), None);
        assert_eq!(Column::Id.default_cell(), None);
    }

    #[test]
    fn test_detect_versions() {
        assert_eq!(SchemaVersion::detect(&V1_HEADERS), Some(SchemaVersion::V1));

        let mut v2: Vec<&str> = V1_HEADERS.to_vec();
        v2.push("Others");
        assert_eq!(SchemaVersion::detect(&v2), Some(SchemaVersion::V2));

        let current: Vec<&str> = Column::current().into_iter().map(Column::name).collect();
        assert_eq!(SchemaVersion::detect(&current), Some(SchemaVersion::V4));

        assert_eq!(SchemaVersion::detect(&["Name", "Date"]), None);
    }

    #[test]
    fn test_parse_whole_number_accepts_legacy_floats() {
        assert_eq!(parse_whole_number("").unwrap(), None);
        assert_eq!(parse_whole_number(" 4 ").unwrap(), Some(4));
        assert_eq!(parse_whole_number("3.0").unwrap(), Some(3));
        assert!(parse_whole_number("2.5").is_err());
        assert!(parse_whole_number("-1").is_err());
        assert!(parse_whole_number("NaN").is_err());
    }

    #[test]
    fn test_parse_time_cell_formats() {
        let expected = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert_eq!(parse_time_cell("14:30").unwrap(), expected);
        assert_eq!(parse_time_cell("14:30:59").unwrap(), expected);
        assert_eq!(parse_time_cell("02:30 PM").unwrap(), expected);
        assert!(parse_time_cell("half past two").is_err());
    }

    #[test]
    fn test_normalize_backfills_v1_rows() {
        let table = normalize_schema(raw(
            &V1_HEADERS,
            &[&["Asha", "2024-01-01", "09:15 AM", "2", "1", "0", "0", "0", "0", "3", "Not Paid"]],
        ))
        .unwrap();

        let record = &table.records()[0];
        assert_eq!(record.id, RecordId(0));
        assert_eq!(record.name, "Asha");
        assert_eq!(record.time, NaiveTime::from_hms_opt(9, 15, 0).unwrap());
        assert_eq!(record.intake.get(Category::Others), 0);
        assert_eq!(record.total_clothes(), 3);
        assert_eq!(record.payment_status, PaymentStatus::Pending);
        assert_eq!(record.receipt, crate::entities::Receipt::default());
    }

    #[test]
    fn test_normalize_recomputes_stale_totals() {
        let table = normalize_schema(raw(
            &V1_HEADERS,
            &[&["Ravi", "2024-01-02", "10:00", "1", "1", "1", "0", "0", "0", "99", "Paid"]],
        ))
        .unwrap();

        assert_eq!(table.records()[0].total_clothes(), 3);
        assert!(table.records()[0].is_paid());
    }

    #[test]
    fn test_normalize_assigns_ids_after_existing_max() {
        let table = normalize_schema(raw(
            &["Id", "Name", "Date", "Time"],
            &[
                &["", "A", "2024-01-01", "08:00"],
                &["7", "B", "2024-01-01", "08:05"],
                &["", "C", "2024-01-01", "08:10"],
            ],
        ))
        .unwrap();

        let ids: Vec<RecordId> = table.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId(8), RecordId(7), RecordId(9)]);
    }

    #[test]
    fn test_normalize_rejects_duplicate_ids() {
        let result = normalize_schema(raw(
            &["Id", "Name", "Date", "Time"],
            &[&["1", "A", "2024-01-01", "08:00"], &["1", "B", "2024-01-01", "08:05"]],
        ));
        assert!(matches!(result, Err(Error::StorageUnavailable { .. })));
    }

    #[test]
    fn test_normalize_rejects_blank_id_when_ids_run_out() {
        let max = u64::MAX.to_string();
        let result = normalize_schema(raw(
            &["Id", "Name", "Date", "Time"],
            &[&[max.as_str(), "A", "2024-01-01", "08:00"], &["", "B", "2024-01-01", "08:05"]],
        ));

        let Err(Error::StorageUnavailable { message, .. }) = result else {
            panic!("expected StorageUnavailable");
        };
        assert!(message.contains("no record ids left"));
    }

    #[test]
    fn test_normalize_keeps_max_id_when_no_row_needs_one() {
        let max = u64::MAX.to_string();
        let table = normalize_schema(raw(
            &["Id", "Name", "Date", "Time"],
            &[&["3", "A", "2024-01-01", "08:00"], &[max.as_str(), "B", "2024-01-01", "08:05"]],
        ))
        .unwrap();

        let ids: Vec<RecordId> = table.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId(3), RecordId(u64::MAX)]);
    }

    #[test]
    fn test_normalize_keeps_cell_text_as_stored() {
        let table = normalize_schema(raw(
            &["Name", "Date", "Time", "Received_By"],
            &[&[" Asha ", "2024-01-01", "08:00", " Meena "]],
        ))
        .unwrap();

        let record = &table.records()[0];
        assert_eq!(record.name, " Asha ");
        assert_eq!(record.receipt.received_by, " Meena ");
    }

    #[test]
    fn test_normalize_rejects_missing_required_column() {
        let result = normalize_schema(raw(&["Name", "Time"], &[]));
        let Err(Error::StorageUnavailable { message, .. }) = result else {
            panic!("expected StorageUnavailable");
        };
        assert!(message.contains("Date"));
    }

    #[test]
    fn test_normalize_rejects_negative_counts() {
        let result = normalize_schema(raw(
            &["Name", "Date", "Time", "Shirts"],
            &[&["A", "2024-01-01", "08:00", "-2"]],
        ));
        let Err(Error::StorageUnavailable { message, .. }) = result else {
            panic!("expected StorageUnavailable");
        };
        assert!(message.contains("row 1"));
        assert!(message.contains("Shirts"));
    }

    #[test]
    fn test_normalize_reads_blank_receipt_cells_as_defaults() {
        let table = normalize_schema(raw(
            &["Name", "Date", "Time", "Received_By", "Received_Date", "Shirts_Received"],
            &[&["A", "2024-01-01", "08:00", "", "", ""]],
        ))
        .unwrap();

        let receipt = &table.records()[0].receipt;
        assert!(!receipt.is_recorded());
    }
}

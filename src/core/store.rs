//! Record store - The table of intake records and the file that backs it.
//!
//! The table lives in memory only for the length of one operation: it is loaded,
//! mutated and written back in full. Mutators validate before they touch a row, so
//! a failed operation leaves the table exactly as it was. The medium is a
//! comma-delimited file with a header row in the layout of
//! [`SchemaVersion::CURRENT`](crate::core::schema::SchemaVersion::CURRENT).
//!
//! Every save rewrites the whole file. Ledgers here are small, and a single flat
//! file keeps the export format identical to the storage format.

use crate::{
    core::{
        fields::FieldUpdate,
        schema::{Column, RawTable, canonical_time, normalize_schema, render_cell},
    },
    entities::{Record, RecordId},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// The in-memory ledger: records in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    /// An empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Wraps records that already carry unique ids.
    #[must_use]
    pub const fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Records in display order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Zero-based display position of a record.
    #[must_use]
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    /// The id [`Table::append`] will assign next: one past the current maximum.
    ///
    /// `None` once the largest id is `u64::MAX`.
    #[must_use]
    pub fn next_id(&self) -> Option<RecordId> {
        self.records
            .iter()
            .map(|record| record.id)
            .max()
            .map_or(Some(RecordId(0)), RecordId::checked_next)
    }

    /// Adds a record at the end of the table under a fresh id, which is returned.
    ///
    /// Whatever id `record` carried is replaced and the time is truncated to the
    /// minute, as it is stored. Counts must already be validated.
    ///
    /// # Errors
    /// `IdsExhausted` when no id is left; the table is left untouched.
    pub fn append(&mut self, mut record: Record) -> Result<RecordId> {
        let id = self.next_id().ok_or_else(|| Error::IdsExhausted {
            last: RecordId(u64::MAX),
        })?;
        record.id = id;
        record.time = canonical_time(record.time);
        self.records.push(record);
        Ok(id)
    }

    /// Applies `update` to the record with `id`.
    ///
    /// # Errors
    /// `IdentityNotFound` when no record has that id; the table is left untouched.
    pub fn update_field(&mut self, id: RecordId, update: &FieldUpdate) -> Result<&Record> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(Error::IdentityNotFound { id })?;
        update.apply(record);
        Ok(&*record)
    }

    /// Applies `update` to every record matching `predicate`; returns how many matched.
    ///
    /// Zero matches is not an error.
    pub fn update_by_predicate<P>(&mut self, predicate: P, update: &FieldUpdate) -> usize
    where
        P: Fn(&Record) -> bool,
    {
        let mut affected = 0;
        for record in self.records.iter_mut().filter(|record| predicate(record)) {
            update.apply(record);
            affected += 1;
        }
        affected
    }

    /// Removes the records with the given ids; returns the ids actually removed.
    ///
    /// Unknown ids are ignored. The remaining records keep their order, so display
    /// positions close up from zero while ids stay as they were.
    pub fn delete(&mut self, ids: &[RecordId]) -> Vec<RecordId> {
        let mut removed = Vec::new();
        self.records.retain(|record| {
            if ids.contains(&record.id) {
                removed.push(record.id);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Records taken in on `date`, in display order.
    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &Record> + '_ {
        self.records.iter().filter(move |record| record.date == date)
    }
}

/// Reads a delimited table of any schema revision.
///
/// # Errors
/// `StorageUnavailable` when the text is not a well-formed table or fails
/// [`normalize_schema`].
pub fn read_table<R: Read>(reader: R, source: &Path) -> Result<Table> {
    let unavailable = |message: String| Error::StorageUnavailable {
        path: source.to_path_buf(),
        message,
    };

    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| unavailable(e.to_string()))?
        .iter()
        .map(ToString::to_string)
        .collect();

    if headers.iter().all(|header| header.trim().is_empty()) {
        return Err(unavailable("no header row".to_string()));
    }

    let rows = csv_reader
        .records()
        .map(|row| {
            row.map(|row| row.iter().map(ToString::to_string).collect())
                .map_err(|e| unavailable(e.to_string()))
        })
        .collect::<Result<Vec<Vec<String>>>>()?;

    normalize_schema(RawTable {
        source: source.to_path_buf(),
        headers,
        rows,
    })
}

/// Writes `table` in the current layout.
///
/// # Errors
/// Returns an error if the writer fails.
pub fn write_table<W: Write>(table: &Table, writer: W) -> Result<()> {
    let columns = Column::current();
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(columns.iter().map(|column| column.name()))?;
    for record in table.records() {
        csv_writer.write_record(columns.iter().map(|column| render_cell(record, *column)))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// The table serialized exactly as it is saved, for download.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn export(table: &Table) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_table(table, &mut buffer)?;
    Ok(buffer)
}

/// The file-backed ledger.
#[derive(Clone, Debug)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    /// A store backed by the file at `path`. Nothing is read until [`RecordStore::load`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole table.
    ///
    /// A missing file is an empty table. A file that exists but cannot be read as a
    /// table is an error; it is never replaced by an empty one.
    ///
    /// # Errors
    /// `StorageUnavailable` for an unreadable table, `Io` for other file errors.
    #[instrument(skip(self), fields(path = ?self.path))]
    pub fn load(&self) -> Result<Table> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No ledger file yet, starting empty");
                return Ok(Table::new());
            }
            Err(e) => return Err(e.into()),
        };

        let table = read_table(io::BufReader::new(file), &self.path)?;
        debug!("Loaded {} records", table.len());
        Ok(table)
    }

    /// Overwrites the file with `table`.
    ///
    /// The new content is written to a uniquely named temporary file in the same
    /// directory and persisted over the ledger, so a crash mid-write leaves the
    /// previous table intact. The temporary file is removed if anything fails.
    ///
    /// # Errors
    /// `Io` when the directory or file cannot be written.
    #[instrument(skip(self, table), fields(path = ?self.path, records = table.len()))]
    pub fn save(&self, table: &Table) -> Result<()> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        let bytes = export(table)?;
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        debug!("Saved {} records", table.len());
        Ok(())
    }

    /// Runs one load → mutate → save cycle.
    ///
    /// The table is saved only when `operation` succeeds, so an operation either
    /// lands completely or not at all.
    ///
    /// # Errors
    /// Whatever `load`, `operation` or `save` returns.
    pub fn transact<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&mut Table) -> Result<T>,
    {
        let mut table = self.load()?;
        let output = operation(&mut table)?;
        self.save(&table)?;
        info!("Ledger saved with {} records", table.len());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::schema::default_record,
        entities::{Category, CategoryCounts, PaymentStatus},
        test_utils::*,
    };
    use chrono::NaiveTime;

    fn record_on(name: &str, date: NaiveDate, counts: CategoryCounts) -> Record {
        let mut record = default_record();
        record.name = name.to_string();
        record.date = date;
        record.intake = counts;
        record
    }

    #[test]
    fn test_load_missing_file_is_empty() -> Result<()> {
        let (_dir, store) = setup_test_store()?;
        let table = store.load()?;
        assert!(table.is_empty());
        Ok(())
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let mut table = Table::new();
        let first = table.append(record_on("A", sample_date(), CategoryCounts::new())).unwrap();
        let second = table.append(record_on("B", sample_date(), CategoryCounts::new())).unwrap();

        assert_eq!(first, RecordId(0));
        assert_eq!(second, RecordId(1));
        assert_eq!(table.next_id(), Some(RecordId(2)));
    }

    #[test]
    fn test_append_after_delete_does_not_reuse_live_ids() {
        let mut table = Table::new();
        table.append(record_on("A", sample_date(), CategoryCounts::new())).unwrap();
        let b = table.append(record_on("B", sample_date(), CategoryCounts::new())).unwrap();
        table.delete(&[RecordId(0)]);

        let c = table.append(record_on("C", sample_date(), CategoryCounts::new())).unwrap();
        assert_eq!(b, RecordId(1));
        assert_eq!(c, RecordId(2));
    }

    #[test]
    fn test_update_field_unknown_id() {
        let mut table = Table::new();
        table.append(record_on("A", sample_date(), CategoryCounts::new())).unwrap();
        let before = table.clone();

        let result = table.update_field(
            RecordId(5),
            &FieldUpdate::PaymentStatus(PaymentStatus::Paid),
        );
        assert!(matches!(
            result,
            Err(Error::IdentityNotFound { id: RecordId(5) })
        ));
        assert_eq!(table, before);
    }

    #[test]
    fn test_update_received_count_recomputes_total() -> Result<()> {
        let mut table = Table::new();
        let id = table
            .append(record_on("A", sample_date(), sample_counts()))
            .unwrap();

        table.update_field(id, &FieldUpdate::ReceivedCount(Category::Shirts, 3))?;
        let record = table.update_field(id, &FieldUpdate::ReceivedCount(Category::Pants, 2))?;

        assert_eq!(record.total_received(), 5);
        Ok(())
    }

    #[test]
    fn test_update_by_predicate_counts_matches() {
        let mut table = Table::new();
        let day = sample_date();
        let other_day = day.succ_opt().unwrap();
        table.append(record_on("A", day, CategoryCounts::new())).unwrap();
        table.append(record_on("B", other_day, CategoryCounts::new())).unwrap();
        table.append(record_on("C", day, CategoryCounts::new())).unwrap();

        let affected = table.update_by_predicate(
            |record| record.date == day,
            &FieldUpdate::PaymentStatus(PaymentStatus::Paid),
        );

        assert_eq!(affected, 2);
        let paid: Vec<&str> = table
            .records()
            .iter()
            .filter(|r| r.is_paid())
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(paid, vec!["A", "C"]);
    }

    #[test]
    fn test_delete_ignores_unknown_ids() {
        let mut table = Table::new();
        table.append(record_on("A", sample_date(), CategoryCounts::new())).unwrap();
        table.append(record_on("B", sample_date(), CategoryCounts::new())).unwrap();
        table.append(record_on("C", sample_date(), CategoryCounts::new())).unwrap();

        let removed = table.delete(&[RecordId(1), RecordId(42)]);

        assert_eq!(removed, vec![RecordId(1)]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.position(RecordId(2)), Some(1));
        assert!(table.get(RecordId(1)).is_none());
    }

    #[test]
    fn test_save_then_load_round_trips() -> Result<()> {
        let (_dir, store) = setup_test_store()?;
        let mut table = Table::new();
        let id = table.append(record_on("Asha, Flat 4", sample_date(), sample_counts())).unwrap();
        table.update_field(id, &FieldUpdate::ReceivedBy("Meena \"M\"".to_string()))?;
        table.update_field(id, &FieldUpdate::ReceivedDate(sample_date().succ_opt()))?;

        store.save(&table)?;
        let loaded = store.load()?;

        assert_eq!(loaded, table);
        Ok(())
    }

    #[test]
    fn test_padded_receiver_survives_reload() -> Result<()> {
        let (_dir, store) = setup_test_store()?;
        let mut table = Table::new();
        let id = table.append(record_on("A", sample_date(), sample_counts()))?;
        table.update_field(id, &FieldUpdate::ReceivedBy(" x ".to_string()))?;

        store.save(&table)?;

        assert_eq!(store.load()?, table);
        Ok(())
    }

    #[test]
    fn test_save_is_byte_stable() -> Result<()> {
        let (_dir, store) = setup_test_store()?;
        let mut table = Table::new();
        table.append(record_on("A", sample_date(), sample_counts())).unwrap();
        table.append(record_on("B", sample_date(), CategoryCounts::new())).unwrap();
        store.save(&table)?;
        let first = fs::read(store.path())?;

        store.save(&store.load()?)?;
        let second = fs::read(store.path())?;

        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_append_fails_once_ids_run_out() {
        let mut last = record_on("A", sample_date(), CategoryCounts::new());
        last.id = RecordId(u64::MAX);
        let mut table = Table::from_records(vec![last]);

        let result = table.append(record_on("B", sample_date(), CategoryCounts::new()));

        assert!(matches!(result, Err(Error::IdsExhausted { .. })));
        assert_eq!(table.len(), 1);
        assert_eq!(table.next_id(), None);
    }

    #[test]
    fn test_append_stores_minute_precision() -> Result<()> {
        let (_dir, store) = setup_test_store()?;
        let mut record = record_on("A", sample_date(), sample_counts());
        record.time = NaiveTime::from_hms_opt(10, 30, 59).unwrap();

        let mut table = Table::new();
        let id = table.append(record)?;
        store.save(&table)?;

        assert_eq!(table.get(id).unwrap().time, sample_time());
        assert_eq!(store.load()?, table);
        Ok(())
    }

    #[test]
    fn test_save_leaves_no_temporary_files() -> Result<()> {
        let (dir, store) = setup_test_store()?;
        let mut table = Table::new();
        table.append(record_on("A", sample_date(), sample_counts()))?;
        store.save(&table)?;
        store.save(&table)?;

        let names: Vec<_> = fs::read_dir(dir.path())?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<io::Result<_>>()?;
        assert_eq!(names, vec![std::ffi::OsString::from("clothes_data.csv")]);
        Ok(())
    }

    #[test]
    fn test_failed_save_cleans_up_temporary_file() -> Result<()> {
        let (dir, _) = setup_test_store()?;
        // A directory where the ledger should be makes the final rename fail.
        let blocked = dir.path().join("ledger.csv");
        fs::create_dir_all(blocked.join("occupied"))?;
        let store = RecordStore::new(&blocked);

        assert!(store.save(&Table::new()).is_err());
        let names: Vec<_> = fs::read_dir(dir.path())?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<io::Result<_>>()?;
        assert_eq!(names, vec![std::ffi::OsString::from("ledger.csv")]);
        Ok(())
    }

    #[test]
    fn test_save_creates_parent_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = RecordStore::new(dir.path().join("nested").join("ledger.csv"));
        store.save(&Table::new())?;

        let text = fs::read_to_string(store.path())?;
        assert!(text.starts_with("Id,Name,Date,Time,Shirts"));
        Ok(())
    }

    #[test]
    fn test_load_unparseable_file_propagates() -> Result<()> {
        let (_dir, store) = setup_test_store()?;
        fs::write(store.path(), "Name,Date,Time\nA,2024-01-01\n")?;

        let result = store.load();
        assert!(matches!(result, Err(Error::StorageUnavailable { .. })));
        Ok(())
    }

    #[test]
    fn test_load_empty_file_propagates() -> Result<()> {
        let (_dir, store) = setup_test_store()?;
        fs::write(store.path(), "")?;

        assert!(matches!(
            store.load(),
            Err(Error::StorageUnavailable { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_transact_does_not_save_on_error() -> Result<()> {
        let (_dir, store) = setup_test_store()?;
        store.transact(|table| {
            table.append(record_on("A", sample_date(), CategoryCounts::new())).unwrap();
            Ok(())
        })?;

        let result: Result<()> = store.transact(|table| {
            table.append(record_on("B", sample_date(), CategoryCounts::new())).unwrap();
            Err(Error::validation("Shirts", "rejected"))
        });

        assert!(result.is_err());
        assert_eq!(store.load()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_read_legacy_pandas_export() -> Result<()> {
        let text = "Name,Date,Time,Shirts,Pants,T-shirts,Sarees,Dresses,Dry_clean_shirts,Others,Total_Clothes,Payment_Status,Received_By,Received_Date,Shirts_Received\n\
                    Asha,2024-01-01,09:00 AM,2,1,0,0,0,0,0,3,Paid,Meena,2024-01-03,2.0\n\
                    Ravi,2024-01-02,05:45 PM,1,0,0,0,0,0,,1,Pending,,,\n";

        let table = read_table(text.as_bytes(), Path::new("legacy.csv"))?;

        assert_eq!(table.len(), 2);
        let asha = &table.records()[0];
        assert_eq!(asha.id, RecordId(0));
        assert_eq!(asha.total_received(), 2);
        assert_eq!(asha.receipt.received_by, "Meena");
        let ravi = &table.records()[1];
        assert_eq!(ravi.id, RecordId(1));
        assert_eq!(ravi.intake.get(Category::Others), 0);
        assert_eq!(ravi.receipt.received_date, None);
        Ok(())
    }
}

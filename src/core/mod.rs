/// Per-field edits and input parsing shared by intake and updates
pub mod fields;
/// Taking garments in at the counter
pub mod intake;
/// Deleting, viewing and updating existing records
pub mod records;
/// Read-only projections for display
pub mod report;
/// Column layout, schema versions and legacy-table normalization
pub mod schema;
/// The on-disk ledger and its in-memory table
pub mod store;

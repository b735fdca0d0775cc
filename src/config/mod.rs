/// Settings loading from config.toml
pub mod settings;

/// Ledger path resolution from the environment and settings
pub mod storage;

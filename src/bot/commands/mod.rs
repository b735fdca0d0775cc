//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility commands
pub mod general;

/// Taking garments in
pub mod intake;

/// Viewing, exporting and deleting records
pub mod records;

/// Payment and return updates
pub mod update;

// Export commands
pub use general::*;
pub use intake::*;
pub use records::*;
pub use update::*;

//! Entity module - The record model kept in the ironing ledger.
//! A record is one intake at the counter, counted per garment category,
//! with a payment status and optional return information.

pub mod category;
pub mod payment;
pub mod record;

pub use category::{Category, CategoryCounts};
pub use payment::PaymentStatus;
pub use record::{Receipt, Record, RecordId};

//! Record entity - One intake transaction at the counter.
//!
//! A record is created at intake with its receipt empty, may have its payment
//! status changed any number of times, and is completed by a receipt listing what
//! went back to the customer. Totals are never stored on the record; they are
//! computed from the category counts so they cannot drift.

use super::{CategoryCounts, PaymentStatus};
use crate::core::schema::compute_total;
use chrono::{NaiveDate, NaiveTime};
use std::{fmt, str::FromStr};

/// Stable identifier of a record.
///
/// Assigned once at creation (one past the largest id in the table) and never
/// reused for another record while the table holds that id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u64);

impl RecordId {
    /// The id following this one, or `None` once ids run out.
    #[must_use]
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) => Some(Self(next)),
            None => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    /// Accepts `7` or `#7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.strip_prefix('#').unwrap_or(s).trim().parse().map(Self)
    }
}

/// Return information, filled in when garments go back to the customer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Who collected the garments (empty until a return is recorded)
    pub received_by: String,
    /// When they were collected
    pub received_date: Option<NaiveDate>,
    /// Garments handed back, per category
    pub counts: CategoryCounts,
}

impl Receipt {
    /// Whether any return information has been recorded.
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        !self.received_by.is_empty() || self.received_date.is_some() || !self.counts.is_empty()
    }
}

/// A single intake row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Stable identity used for update and delete addressing
    pub id: RecordId,
    /// Customer / drop-off name, free text
    pub name: String,
    /// Intake date
    pub date: NaiveDate,
    /// Intake time, minute precision
    pub time: NaiveTime,
    /// Garments handed in, per category
    pub intake: CategoryCounts,
    /// Payment state
    pub payment_status: PaymentStatus,
    /// Return information
    pub receipt: Receipt,
}

impl Record {
    /// `Total_Clothes`: sum of the intake counts.
    #[must_use]
    pub fn total_clothes(&self) -> u64 {
        compute_total(&self.intake)
    }

    /// `Total_Clothes_Received`: sum of the return counts.
    #[must_use]
    pub fn total_received(&self) -> u64 {
        compute_total(&self.receipt.counts)
    }

    /// Garments still held by the shop.
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.total_clothes().saturating_sub(self.total_received())
    }

    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::schema::default_record, entities::Category};

    #[test]
    fn test_record_id_parse() {
        assert_eq!("12".parse::<RecordId>().unwrap(), RecordId(12));
        assert_eq!(" #3 ".parse::<RecordId>().unwrap(), RecordId(3));
        assert!("-1".parse::<RecordId>().is_err());
        assert!("abc".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_checked_next_stops_at_max() {
        assert_eq!(RecordId(4).checked_next(), Some(RecordId(5)));
        assert_eq!(RecordId(u64::MAX).checked_next(), None);
    }

    #[test]
    fn test_totals_follow_counts() {
        let mut record = default_record();
        record.intake = CategoryCounts::new()
            .with(Category::Shirts, 4)
            .with(Category::Sarees, 1);
        record.receipt.counts = CategoryCounts::new().with(Category::Shirts, 3);

        assert_eq!(record.total_clothes(), 5);
        assert_eq!(record.total_received(), 3);
        assert_eq!(record.outstanding(), 2);
        assert!(record.receipt.is_recorded());
    }

    #[test]
    fn test_outstanding_never_underflows() {
        let mut record = default_record();
        record.receipt.counts = CategoryCounts::new().with(Category::Pants, 2);
        assert_eq!(record.outstanding(), 0);
    }
}

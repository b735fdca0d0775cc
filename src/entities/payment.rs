//! Payment status of a record.
//!
//! Early sheets stored free text here ("Paid", "Not Paid", blank). New input is
//! restricted to the two enum values; legacy text is folded into them on load.

use crate::errors::Error;
use std::{fmt, str::FromStr};

/// Whether the customer has paid for a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    /// Not yet paid (the default for new intake)
    #[default]
    Pending,
    /// Settled
    Paid,
}

impl PaymentStatus {
    /// Both statuses, for autocomplete.
    pub const ALL: [Self; 2] = [Self::Pending, Self::Paid];

    /// Persisted and displayed spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
        }
    }

    /// Reads a stored cell from any schema revision.
    ///
    /// Only "paid" (any case) counts as paid; blanks, "Not Paid" and unknown text
    /// read as pending. Returns whether the text was recognised so callers can log.
    #[must_use]
    pub fn from_legacy(raw: &str) -> (Self, bool) {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("paid") {
            return (Self::Paid, true);
        }
        let recognised = trimmed.is_empty()
            || ["pending", "not paid", "unpaid"]
                .iter()
                .any(|known| trimmed.eq_ignore_ascii_case(known));
        (Self::Pending, recognised)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = Error;

    /// Strict parse for user input: `Pending` or `Paid`, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::validation(
                    "Payment_Status",
                    format!("'{s}' is not a payment status (expected Pending or Paid)"),
                )
            })
    }
}

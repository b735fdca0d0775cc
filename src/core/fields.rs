//! Field updates and input validation.
//!
//! Everything a user types passes through here before it reaches the store:
//! counts must be non-negative whole numbers, dates are `YYYY-MM-DD`, and only
//! non-derived columns can be edited. A [`FieldUpdate`] is a validated change to one
//! column of one record.

use crate::{
    core::schema::{Column, canonical_time, parse_date_cell, parse_time_cell},
    entities::{Category, PaymentStatus, Record},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};

/// A validated change to a single editable column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Replace `Name`
    Name(String),
    /// Replace `Date`
    Date(NaiveDate),
    /// Replace `Time`
    Time(NaiveTime),
    /// Replace one intake count
    Count(Category, u32),
    /// Replace `Payment_Status`
    PaymentStatus(PaymentStatus),
    /// Replace `Received_By`
    ReceivedBy(String),
    /// Replace or clear `Received_Date`
    ReceivedDate(Option<NaiveDate>),
    /// Replace one return count
    ReceivedCount(Category, u32),
}

impl FieldUpdate {
    /// Column this update writes.
    #[must_use]
    pub const fn column(&self) -> Column {
        match self {
            Self::Name(_) => Column::Name,
            Self::Date(_) => Column::Date,
            Self::Time(_) => Column::Time,
            Self::Count(category, _) => Column::Count(*category),
            Self::PaymentStatus(_) => Column::PaymentStatus,
            Self::ReceivedBy(_) => Column::ReceivedBy,
            Self::ReceivedDate(_) => Column::ReceivedDate,
            Self::ReceivedCount(category, _) => Column::Received(*category),
        }
    }

    /// Writes the new value into `record`.
    ///
    /// Totals are computed from the counts, so a count update is all it takes for
    /// `Total_Clothes` / `Total_Clothes_Received` to follow.
    pub fn apply(&self, record: &mut Record) {
        match self {
            Self::Name(name) => record.name.clone_from(name),
            Self::Date(date) => record.date = *date,
            Self::Time(time) => record.time = canonical_time(*time),
            Self::Count(category, count) => record.intake.set(*category, *count),
            Self::PaymentStatus(status) => record.payment_status = *status,
            Self::ReceivedBy(name) => record.receipt.received_by.clone_from(name),
            Self::ReceivedDate(date) => record.receipt.received_date = *date,
            Self::ReceivedCount(category, count) => record.receipt.counts.set(*category, *count),
        }
    }

    /// Builds an update from a column name and the raw text a user entered.
    ///
    /// # Errors
    /// `Validation` when the column is unknown, derived (`Id`, totals), or the value
    /// does not parse for that column.
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        let column = Column::from_name(field)
            .ok_or_else(|| Error::validation(field, "no such field"))?;

        match column {
            Column::Id | Column::TotalClothes | Column::TotalReceived => Err(Error::validation(
                column.name(),
                "cannot be edited directly",
            )),
            Column::Name => Ok(Self::Name(raw.trim().to_string())),
            Column::Date => parse_date_input(column.name(), raw).map(Self::Date),
            Column::Time => parse_time_input(column.name(), raw).map(Self::Time),
            Column::Count(category) => {
                parse_count_input(column.name(), raw).map(|count| Self::Count(category, count))
            }
            Column::PaymentStatus => raw.parse().map(Self::PaymentStatus),
            Column::ReceivedBy => Ok(Self::ReceivedBy(raw.trim().to_string())),
            Column::ReceivedDate => {
                if raw.trim().is_empty() {
                    Ok(Self::ReceivedDate(None))
                } else {
                    parse_date_input(column.name(), raw).map(|date| Self::ReceivedDate(Some(date)))
                }
            }
            Column::Received(category) => parse_count_input(column.name(), raw)
                .map(|count| Self::ReceivedCount(category, count)),
        }
    }
}

/// Names of every column [`FieldUpdate::parse`] accepts.
#[must_use]
pub fn editable_fields() -> Vec<&'static str> {
    Column::current()
        .into_iter()
        .filter(|column| *column != Column::Id && !column.is_derived())
        .map(Column::name)
        .collect()
}

/// Checks a count entered by a user.
///
/// # Errors
/// `Validation` when the value is negative or does not fit a count.
pub fn validate_count(field: &str, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(Error::validation(
            field,
            format!("{value} is negative; counts must be 0 or more"),
        ));
    }
    u32::try_from(value).map_err(|_| Error::validation(field, format!("{value} is too large")))
}

/// Parses and checks a count typed as text.
///
/// # Errors
/// `Validation` when the text is not a whole number or fails [`validate_count`].
pub fn parse_count_input(field: &str, raw: &str) -> Result<u32> {
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::validation(field, format!("'{}' is not a whole number", raw.trim())))?;
    validate_count(field, value)
}

/// Parses a `YYYY-MM-DD` date typed by a user.
///
/// # Errors
/// `Validation` when the text is not a valid date.
pub fn parse_date_input(field: &str, raw: &str) -> Result<NaiveDate> {
    parse_date_cell(raw).map_err(|message| Error::validation(field, message))
}

/// Parses a time typed by a user (`14:30`, `2:30 PM`, ...).
///
/// # Errors
/// `Validation` when the text is not a time of day.
pub fn parse_time_input(field: &str, raw: &str) -> Result<NaiveTime> {
    parse_time_cell(raw).map_err(|message| Error::validation(field, message))
}

//! Calendar date helpers.
//!
//! Dates cross the API as `YYYY-MM-DD` strings and are compared against
//! "today" supplied by the caller, which keeps these helpers pure.

use chrono::NaiveDate;
use thiserror::Error;

/// Format used for every date in the API and in storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that can occur when validating a date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Not a `YYYY-MM-DD` calendar date.
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    Malformed(String),
    /// The date is after today.
    #[error("date {0} is in the future")]
    InFuture(NaiveDate),
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`DateError::Malformed`] if the input is not a valid date.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate, DateError> {
    let trimmed = input.trim();
    // chrono accepts unpadded fields, the API does not
    if trimmed.len() != 10 {
        return Err(DateError::Malformed(input.to_owned()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| DateError::Malformed(input.to_owned()))
}

/// Reject dates after `today`.
///
/// # Errors
///
/// Returns [`DateError::InFuture`] if `date` is later than `today`.
pub fn ensure_not_future(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, DateError> {
    if date > today {
        return Err(DateError::InFuture(date));
    }
    Ok(date)
}

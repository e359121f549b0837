//! Calendar month arithmetic for installment schedules
//!
//! Installments fall due on the same day of the month as the first due date.
//! When that day does not exist in the target month the date is clamped to
//! the last day of that month (Jan 31 + 1 month = Feb 28 or 29).

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Date out of range: {date} + {months} months")]
    OutOfRange {
        date: NaiveDate,
        months: u32,
    },
}

/// Adds a number of calendar months to a date, clamping to the month end
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, TemporalError> {
    date.checked_add_months(Months::new(months))
        .ok_or(TemporalError::OutOfRange { date, months })
}

/// A fixed step between consecutive installments, in calendar months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthStep(u32);

impl MonthStep {
    pub const MONTHLY: MonthStep = MonthStep(1);
    pub const SEMIANNUAL: MonthStep = MonthStep(6);
    pub const ANNUAL: MonthStep = MonthStep(12);

    pub fn new(months: u32) -> Self {
        Self(months)
    }

    pub fn months(&self) -> u32 {
        self.0
    }

    /// Due date of the installment at zero-based position `k`
    ///
    /// Always computed from `first` rather than from the previous installment,
    /// so a clamped February does not drag later months back to the 28th.
    pub fn nth(&self, first: NaiveDate, k: u32) -> Result<NaiveDate, TemporalError> {
        let months = self
            .0
            .checked_mul(k)
            .ok_or(TemporalError::OutOfRange { date: first, months: u32::MAX })?;
        add_months(first, months)
    }

    /// Due dates for `count` installments starting at `first`
    pub fn series(&self, first: NaiveDate, count: u32) -> Result<Vec<NaiveDate>, TemporalError> {
        (0..count).map(|k| self.nth(first, k)).collect()
    }
}

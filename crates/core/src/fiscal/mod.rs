//! Fiscal years and periods.
//!
//! A fiscal year is split into contiguous, non-overlapping monthly periods.
//! Periods close in order and reopen in reverse order; the open/closed flag
//! decides whether the ledger accepts postings dated inside the period.

pub mod calendar;
pub mod error;
pub mod period;

#[cfg(test)]
mod calendar_props;

pub use calendar::{PeriodLedger, date_ranges_overlap, generate_monthly_periods, last_day_of_month};
pub use error::FiscalError;
pub use period::{FiscalPeriod, FiscalYear, PeriodClosure};

//! Fiscal period types.

use chrono::{DateTime, NaiveDate, Utc};
use folio_shared::types::{EmployeeId, FiscalPeriodId, FiscalYearId};
use serde::{Deserialize, Serialize};

/// Fiscal year definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Unique identifier.
    pub id: FiscalYearId,
    /// Year name (e.g., "FY2026").
    pub name: String,
    /// Start date of the fiscal year.
    pub start_date: NaiveDate,
    /// End date of the fiscal year (inclusive).
    pub end_date: NaiveDate,
}

/// Who closed a period, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodClosure {
    /// Employee who closed the period.
    pub closed_by: EmployeeId,
    /// When the close took effect.
    pub closed_at: DateTime<Utc>,
}

/// A fiscal period within a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Fiscal year this period belongs to.
    pub fiscal_year_id: FiscalYearId,
    /// Period number within the year (1-12 for monthly).
    pub period_number: u32,
    /// Period name (e.g., "January 2026").
    pub name: String,
    /// Start date of the period.
    pub start_date: NaiveDate,
    /// End date of the period (inclusive).
    pub end_date: NaiveDate,
    /// Set while the period is closed.
    pub closure: Option<PeriodClosure>,
}

impl FiscalPeriod {
    /// Returns true if transactions can be posted to this period.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.closure.is_none()
    }

    /// Returns true if the period is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closure.is_some()
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

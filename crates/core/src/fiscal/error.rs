//! Fiscal calendar errors.

use chrono::NaiveDate;
use folio_shared::types::{FiscalPeriodId, FiscalYearId};
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors raised by the fiscal calendar.
#[derive(Debug, Error)]
pub enum FiscalError {
    /// Start date must be before end date.
    #[error("Start date must be before end date")]
    InvalidDateRange,

    /// Fiscal year overlaps an existing one.
    #[error("Fiscal year overlaps existing fiscal year {0}")]
    OverlappingYear(String),

    /// Generated periods do not tile the year.
    #[error("Periods of fiscal year {0} are not contiguous")]
    NonContiguousPeriods(FiscalYearId),

    /// Fiscal year not found.
    #[error("Fiscal year not found: {0}")]
    YearNotFound(FiscalYearId),

    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    /// No period covers the date.
    #[error("No fiscal period defined for date {0}")]
    NoPeriodDefined(NaiveDate),

    /// The period covering the date is closed.
    #[error("Fiscal period {period_id} is closed, no posting allowed on {date}")]
    PeriodClosed {
        /// The closed period.
        period_id: FiscalPeriodId,
        /// The rejected date.
        date: NaiveDate,
    },

    /// Period is already closed.
    #[error("Fiscal period {0} is already closed")]
    AlreadyClosed(FiscalPeriodId),

    /// An earlier period of the same year is still open.
    #[error("Cannot close fiscal period {period_id}: earlier period {prior} is still open")]
    PriorPeriodOpen {
        /// The period being closed.
        period_id: FiscalPeriodId,
        /// The earliest open prior period.
        prior: FiscalPeriodId,
    },

    /// Period is not closed.
    #[error("Fiscal period {0} is not closed")]
    NotClosed(FiscalPeriodId),

    /// A later period of the same year is closed.
    #[error("Cannot reopen fiscal period {period_id}: later period {later} is closed")]
    LaterPeriodClosed {
        /// The period being reopened.
        period_id: FiscalPeriodId,
        /// The latest closed later period.
        later: FiscalPeriodId,
    },
}

impl FiscalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::OverlappingYear(_) => "OVERLAPPING_FISCAL_YEAR",
            Self::NonContiguousPeriods(_) => "NON_CONTIGUOUS_PERIODS",
            Self::YearNotFound(_) => "FISCAL_YEAR_NOT_FOUND",
            Self::PeriodNotFound(_) => "FISCAL_PERIOD_NOT_FOUND",
            Self::NoPeriodDefined(_) => "NO_PERIOD_DEFINED",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::AlreadyClosed(_) => "PERIOD_ALREADY_CLOSED",
            Self::PriorPeriodOpen { .. } => "PRIOR_PERIOD_OPEN",
            Self::NotClosed(_) => "PERIOD_NOT_CLOSED",
            Self::LaterPeriodClosed { .. } => "LATER_PERIOD_CLOSED",
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDateRange
            | Self::OverlappingYear(_)
            | Self::NonContiguousPeriods(_)
            | Self::NoPeriodDefined(_) => ErrorKind::Validation,
            Self::YearNotFound(_) | Self::PeriodNotFound(_) => ErrorKind::NotFound,
            Self::PeriodClosed { .. }
            | Self::AlreadyClosed(_)
            | Self::PriorPeriodOpen { .. }
            | Self::NotClosed(_)
            | Self::LaterPeriodClosed { .. } => ErrorKind::StateConflict,
        }
    }
}

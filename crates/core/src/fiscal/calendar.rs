//! Fiscal calendar: years, monthly periods and the close/reopen rules.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use folio_shared::types::{EmployeeId, FiscalPeriodId, FiscalYearId};

use super::error::FiscalError;
use super::period::{FiscalPeriod, FiscalYear, PeriodClosure};

/// Checks if two inclusive date ranges overlap.
///
/// Two ranges [a_start, a_end] and [b_start, b_end] overlap if:
/// a_start <= b_end AND a_end >= b_start
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Returns the last day of the month containing `date`.
#[must_use]
pub fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    next_month.and_then(|d| d.pred_opt())
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

/// Splits `[start_date, end_date]` into calendar-month periods.
///
/// The first and last periods are clipped to the year boundaries, so a year
/// starting mid-month gets a short first period.
#[must_use]
pub fn generate_monthly_periods(
    fiscal_year_id: FiscalYearId,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Vec<FiscalPeriod> {
    let mut periods = Vec::new();
    let mut current = start_date;
    let mut period_number = 1;

    while current <= end_date {
        let Some(month_end) = last_day_of_month(current) else {
            break;
        };
        let period_end = month_end.min(end_date);

        periods.push(FiscalPeriod {
            id: FiscalPeriodId::new(),
            fiscal_year_id,
            period_number,
            name: format!("{} {}", month_name(current.month()), current.year()),
            start_date: current,
            end_date: period_end,
            closure: None,
        });

        period_number += 1;
        match period_end.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    periods
}

/// Checks that `periods` tile the year exactly: no gaps, no overlaps.
pub fn validate_contiguous(year: &FiscalYear, periods: &[FiscalPeriod]) -> Result<(), FiscalError> {
    let (Some(first), Some(last)) = (periods.first(), periods.last()) else {
        return Err(FiscalError::NonContiguousPeriods(year.id));
    };
    if first.start_date != year.start_date || last.end_date != year.end_date {
        return Err(FiscalError::NonContiguousPeriods(year.id));
    }
    for pair in periods.windows(2) {
        if pair[0].end_date.succ_opt() != Some(pair[1].start_date)
            || pair[0].start_date > pair[0].end_date
        {
            return Err(FiscalError::NonContiguousPeriods(year.id));
        }
    }
    Ok(())
}

/// All fiscal years and periods, indexed for date lookup.
///
/// Like the account registry, state changes go through `prepare_*` followed
/// by `apply` so the caller can record an audit entry in between.
#[derive(Debug, Clone, Default)]
pub struct PeriodLedger {
    years: HashMap<FiscalYearId, FiscalYear>,
    periods: HashMap<FiscalPeriodId, FiscalPeriod>,
    by_start: BTreeMap<NaiveDate, FiscalPeriodId>,
}

impl PeriodLedger {
    /// Creates an empty calendar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a new fiscal year and generates its monthly periods.
    pub fn plan_fiscal_year(
        &self,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(FiscalYear, Vec<FiscalPeriod>), FiscalError> {
        if start_date >= end_date {
            return Err(FiscalError::InvalidDateRange);
        }
        if let Some(existing) = self
            .years
            .values()
            .find(|y| date_ranges_overlap(start_date, end_date, y.start_date, y.end_date))
        {
            return Err(FiscalError::OverlappingYear(existing.name.clone()));
        }

        let year = FiscalYear {
            id: FiscalYearId::new(),
            name: name.into(),
            start_date,
            end_date,
        };
        let periods = generate_monthly_periods(year.id, start_date, end_date);
        validate_contiguous(&year, &periods)?;
        Ok((year, periods))
    }

    /// Stores a planned fiscal year with its periods.
    pub fn insert_year(&mut self, year: FiscalYear, periods: Vec<FiscalPeriod>) {
        for period in periods {
            self.by_start.insert(period.start_date, period.id);
            self.periods.insert(period.id, period);
        }
        self.years.insert(year.id, year);
    }

    /// Plans and stores a fiscal year.
    pub fn create_fiscal_year(
        &mut self,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(FiscalYear, Vec<FiscalPeriod>), FiscalError> {
        let (year, periods) = self.plan_fiscal_year(name, start_date, end_date)?;
        self.insert_year(year.clone(), periods.clone());
        Ok((year, periods))
    }

    /// Looks up a fiscal year.
    pub fn year(&self, id: FiscalYearId) -> Result<&FiscalYear, FiscalError> {
        self.years.get(&id).ok_or(FiscalError::YearNotFound(id))
    }

    /// All fiscal years ordered by start date.
    #[must_use]
    pub fn years(&self) -> Vec<&FiscalYear> {
        let mut years: Vec<_> = self.years.values().collect();
        years.sort_by_key(|y| y.start_date);
        years
    }

    /// Looks up a period.
    pub fn period(&self, id: FiscalPeriodId) -> Result<&FiscalPeriod, FiscalError> {
        self.periods.get(&id).ok_or(FiscalError::PeriodNotFound(id))
    }

    /// Periods of a fiscal year ordered by period number.
    #[must_use]
    pub fn periods_of(&self, year_id: FiscalYearId) -> Vec<&FiscalPeriod> {
        let mut periods: Vec<_> = self
            .periods
            .values()
            .filter(|p| p.fiscal_year_id == year_id)
            .collect();
        periods.sort_by_key(|p| p.period_number);
        periods
    }

    /// The period whose range contains `date`.
    pub fn period_for(&self, date: NaiveDate) -> Result<&FiscalPeriod, FiscalError> {
        self.by_start
            .range(..=date)
            .next_back()
            .and_then(|(_, id)| self.periods.get(id))
            .filter(|p| p.contains_date(date))
            .ok_or(FiscalError::NoPeriodDefined(date))
    }

    /// Whether a period is open.
    pub fn is_open(&self, id: FiscalPeriodId) -> Result<bool, FiscalError> {
        self.period(id).map(FiscalPeriod::is_open)
    }

    /// The open period covering `date`, or why posting there is refused.
    pub fn ensure_open_for(&self, date: NaiveDate) -> Result<&FiscalPeriod, FiscalError> {
        let period = self.period_for(date)?;
        if period.is_closed() {
            return Err(FiscalError::PeriodClosed {
                period_id: period.id,
                date,
            });
        }
        Ok(period)
    }

    /// Returns the period as it would look once closed.
    ///
    /// Every earlier period of the same fiscal year must already be closed.
    pub fn prepare_close(
        &self,
        id: FiscalPeriodId,
        closed_by: EmployeeId,
        closed_at: DateTime<Utc>,
    ) -> Result<FiscalPeriod, FiscalError> {
        let period = self.period(id)?;
        if period.is_closed() {
            return Err(FiscalError::AlreadyClosed(id));
        }
        if let Some(prior) = self
            .periods_of(period.fiscal_year_id)
            .into_iter()
            .find(|p| p.period_number < period.period_number && p.is_open())
        {
            return Err(FiscalError::PriorPeriodOpen {
                period_id: id,
                prior: prior.id,
            });
        }

        let mut closed = period.clone();
        closed.closure = Some(PeriodClosure {
            closed_by,
            closed_at,
        });
        Ok(closed)
    }

    /// Returns the period as it would look once reopened.
    ///
    /// No later period of the same fiscal year may be closed.
    pub fn prepare_reopen(&self, id: FiscalPeriodId) -> Result<FiscalPeriod, FiscalError> {
        let period = self.period(id)?;
        if period.is_open() {
            return Err(FiscalError::NotClosed(id));
        }
        if let Some(later) = self
            .periods_of(period.fiscal_year_id)
            .into_iter()
            .rev()
            .find(|p| p.period_number > period.period_number && p.is_closed())
        {
            return Err(FiscalError::LaterPeriodClosed {
                period_id: id,
                later: later.id,
            });
        }

        let mut reopened = period.clone();
        reopened.closure = None;
        Ok(reopened)
    }

    /// Stores a period obtained from `prepare_close` or `prepare_reopen`.
    pub fn apply(&mut self, period: FiscalPeriod) {
        self.periods.insert(period.id, period);
    }

    /// Closes a period.
    pub fn close(
        &mut self,
        id: FiscalPeriodId,
        closed_by: EmployeeId,
        closed_at: DateTime<Utc>,
    ) -> Result<FiscalPeriod, FiscalError> {
        let period = self.prepare_close(id, closed_by, closed_at)?;
        self.apply(period.clone());
        Ok(period)
    }

    /// Reopens a closed period.
    pub fn reopen(&mut self, id: FiscalPeriodId) -> Result<FiscalPeriod, FiscalError> {
        let period = self.prepare_reopen(id)?;
        self.apply(period.clone());
        Ok(period)
    }
}

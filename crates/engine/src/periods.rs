//! Fiscal calendar operations.
//!
//! Closing takes the periods write lock. Every posting holds the read side
//! from its period check through its commit, so a close waits for in-flight
//! postings to finish and no posting can commit into a period after it closed.

use chrono::{NaiveDate, Utc};
use folio_core::audit::{AuditAction, NewAuditRecord};
use folio_core::fiscal::{FiscalPeriod, FiscalYear};
use folio_shared::types::{EmployeeId, FiscalPeriodId, FiscalYearId};
use tracing::{info, warn};

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::locks;

impl Engine {
    /// Creates a fiscal year split into monthly periods, all open.
    pub async fn create_fiscal_year(
        &self,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        actor: EmployeeId,
    ) -> EngineResult<(FiscalYear, Vec<FiscalPeriod>)> {
        let mut periods = locks::write(&self.periods, self.lock_timeout(), "periods").await?;
        let (year, planned) = periods
            .plan_fiscal_year(name, start_date, end_date)
            .inspect_err(|e| warn!(name, error = %e, "Fiscal year rejected"))?;

        let now = Utc::now();
        let mut records = vec![
            NewAuditRecord::new("fiscal_years", year.id, AuditAction::Create, actor, now)
                .after(&year)?,
        ];
        for period in &planned {
            records.push(
                NewAuditRecord::new("fiscal_periods", period.id, AuditAction::Create, actor, now)
                    .after(period)?,
            );
        }
        self.record(records)?;

        periods.insert_year(year.clone(), planned.clone());
        info!(
            fiscal_year_id = %year.id,
            name = %year.name,
            periods = planned.len(),
            "Fiscal year created"
        );
        Ok((year, planned))
    }

    /// Closes a period. Earlier periods of the same year must be closed first.
    pub async fn close_period(
        &self,
        id: FiscalPeriodId,
        actor: EmployeeId,
    ) -> EngineResult<FiscalPeriod> {
        let mut periods = locks::write(&self.periods, self.lock_timeout(), "periods").await?;
        let before = periods.period(id)?.clone();
        let closed = periods
            .prepare_close(id, actor, Utc::now())
            .inspect_err(|e| warn!(period_id = %id, error = %e, "Period close rejected"))?;
        self.record(vec![
            NewAuditRecord::new("fiscal_periods", id, AuditAction::Close, actor, Utc::now())
                .before(&before)?
                .after(&closed)?,
        ])?;
        periods.apply(closed.clone());
        info!(period_id = %id, name = %closed.name, closed_by = %actor, "Fiscal period closed");
        Ok(closed)
    }

    /// Reopens a closed period, if reopening is enabled.
    ///
    /// A period cannot be reopened while a later period of its year is closed.
    pub async fn reopen_period(
        &self,
        id: FiscalPeriodId,
        actor: EmployeeId,
    ) -> EngineResult<FiscalPeriod> {
        if !self.config.allow_reopen {
            warn!(period_id = %id, actor = %actor, "Reopen refused by configuration");
            return Err(EngineError::ReopenDisabled);
        }
        let mut periods = locks::write(&self.periods, self.lock_timeout(), "periods").await?;
        let before = periods.period(id)?.clone();
        let reopened = periods
            .prepare_reopen(id)
            .inspect_err(|e| warn!(period_id = %id, error = %e, "Period reopen rejected"))?;
        self.record(vec![
            NewAuditRecord::new("fiscal_periods", id, AuditAction::Reopen, actor, Utc::now())
                .before(&before)?
                .after(&reopened)?,
        ])?;
        periods.apply(reopened.clone());
        info!(
            period_id = %id,
            name = %reopened.name,
            reopened_by = %actor,
            "Fiscal period reopened"
        );
        Ok(reopened)
    }

    /// The period containing `date`.
    pub async fn period_for(&self, date: NaiveDate) -> EngineResult<FiscalPeriod> {
        let periods = locks::read(&self.periods, self.lock_timeout(), "periods").await?;
        Ok(periods.period_for(date)?.clone())
    }

    /// Looks up a period.
    pub async fn period(&self, id: FiscalPeriodId) -> EngineResult<FiscalPeriod> {
        let periods = locks::read(&self.periods, self.lock_timeout(), "periods").await?;
        Ok(periods.period(id)?.clone())
    }

    /// Whether a period accepts postings.
    pub async fn is_period_open(&self, id: FiscalPeriodId) -> EngineResult<bool> {
        let periods = locks::read(&self.periods, self.lock_timeout(), "periods").await?;
        Ok(periods.is_open(id)?)
    }

    /// Periods of a fiscal year in order.
    pub async fn periods_of(&self, year_id: FiscalYearId) -> EngineResult<Vec<FiscalPeriod>> {
        let periods = locks::read(&self.periods, self.lock_timeout(), "periods").await?;
        periods.year(year_id)?;
        Ok(periods.periods_of(year_id).into_iter().cloned().collect())
    }
}

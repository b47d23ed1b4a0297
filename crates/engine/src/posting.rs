//! Posting and ledger queries.

use chrono::{NaiveDate, Utc};
use folio_core::accounts::AccountType;
use folio_core::audit::{AuditAction, NewAuditRecord};
use folio_core::ledger::{
    AccountBalance, CommitCheck, JournalLine, LedgerError, PostOutcome, PostingReceipt,
    PostingRequest, PostingService, ReferenceTag, TrialBalance, account_gate, period_gate,
    rollup_totals,
};
use folio_shared::types::{AccountId, EmployeeId, FiscalPeriodId};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::locks;

const TABLE: &str = "journal_entries";

impl Engine {
    /// Validates and commits a balanced journal entry.
    ///
    /// Posting is idempotent by reference: repeating a committed request
    /// returns `AlreadyPosted` and changes nothing, while reusing the
    /// reference for different content fails with `DuplicateReference`.
    pub async fn post(&self, request: PostingRequest) -> EngineResult<PostOutcome> {
        self.commit_entry(request, Vec::new()).await
    }

    /// Posts an entry that offsets `original` line for line.
    pub async fn reverse(
        &self,
        original: &ReferenceTag,
        reference: ReferenceTag,
        effective_date: NaiveDate,
        actor: EmployeeId,
    ) -> EngineResult<PostOutcome> {
        self.reverse_entry(original, reference, effective_date, actor, Vec::new())
            .await
    }

    pub(crate) async fn reverse_entry(
        &self,
        original: &ReferenceTag,
        reference: ReferenceTag,
        effective_date: NaiveDate,
        actor: EmployeeId,
        companions: Vec<NewAuditRecord>,
    ) -> EngineResult<PostOutcome> {
        let request = {
            let book = locks::read(&self.book, self.lock_timeout(), "ledger").await?;
            let lines = book
                .entry(original)
                .ok_or_else(|| LedgerError::ReferenceNotFound(original.clone()))?;
            PostingService::reversal_request(lines, reference, effective_date, actor)?
        };
        self.commit_entry(request, companions).await
    }

    /// Commits one entry together with the audit records of whatever else
    /// the calling operation changes.
    ///
    /// The period and account read locks are held from validation through
    /// the commit. The companions are appended in the same audit batch as
    /// the entry, and only when the entry is new.
    pub(crate) async fn commit_entry(
        &self,
        request: PostingRequest,
        companions: Vec<NewAuditRecord>,
    ) -> EngineResult<PostOutcome> {
        let wait = self.lock_timeout();
        let periods = locks::read(&self.periods, wait, "periods").await?;
        let accounts = locks::read(&self.accounts, wait, "accounts").await?;

        {
            let book = locks::read(&self.book, wait, "ledger").await?;
            if let Some(outcome) = replay_or_reject(book.check(&request), &request)? {
                return Ok(outcome);
            }
        }

        let (lines, _) = PostingService::prepare(
            &request,
            Utc::now(),
            account_gate(&accounts),
            period_gate(&periods),
        )
        .inspect_err(|e| {
            warn!(reference = %request.reference, error = %e, "Posting rejected");
        })?;
        let receipt = PostingReceipt::from_lines(&lines).ok_or_else(|| LedgerError::EmptyEntry {
            reference: request.reference.clone(),
            count: 0,
        })?;

        let mut book = locks::write(&self.book, wait, "ledger").await?;
        // Another caller may have committed the same reference meanwhile.
        if let Some(outcome) = replay_or_reject(book.check(&request), &request)? {
            return Ok(outcome);
        }

        let action = if request.reverses.is_some() {
            AuditAction::Reverse
        } else {
            AuditAction::Post
        };
        let mut records = vec![
            NewAuditRecord::new(TABLE, &request.reference, action, request.created_by, Utc::now())
                .after(&lines)?,
        ];
        records.extend(companions);
        self.record(records)?;

        book.commit(lines)?;
        info!(
            reference = %receipt.reference,
            period_id = %receipt.period_id,
            lines = receipt.line_count,
            amount = %receipt.totals.debit,
            reverses = ?request.reverses.as_ref().map(ReferenceTag::as_str),
            "Journal entry posted"
        );
        Ok(PostOutcome::Posted(receipt))
    }

    /// Committed lines of one entry.
    pub async fn entries_for(&self, reference: &ReferenceTag) -> EngineResult<Vec<JournalLine>> {
        let book = locks::read(&self.book, self.lock_timeout(), "ledger").await?;
        book.entry(reference)
            .map(<[JournalLine]>::to_vec)
            .ok_or_else(|| LedgerError::ReferenceNotFound(reference.clone()).into())
    }

    /// Reference of the entry that reversed `reference`, if any.
    pub async fn reversal_of(
        &self,
        reference: &ReferenceTag,
    ) -> EngineResult<Option<ReferenceTag>> {
        let book = locks::read(&self.book, self.lock_timeout(), "ledger").await?;
        Ok(book.reversal_of(reference).cloned())
    }

    /// Balance of one account from lines effective on or before `as_of`.
    pub async fn balance_of(
        &self,
        account_id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> EngineResult<AccountBalance> {
        let wait = self.lock_timeout();
        let accounts = locks::read(&self.accounts, wait, "accounts").await?;
        let balance_type = accounts.resolve(account_id)?.balance_type;
        let book = locks::read(&self.book, wait, "ledger").await?;
        let (debit, credit) = book.totals_for(account_id, as_of);
        Ok(AccountBalance::new(account_id, balance_type, debit, credit))
    }

    /// Balance of an account and all of its descendants, signed by the
    /// root account's balance type.
    pub async fn rollup_balance_of(
        &self,
        account_id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> EngineResult<AccountBalance> {
        let wait = self.lock_timeout();
        let accounts = locks::read(&self.accounts, wait, "accounts").await?;
        let balance_type = accounts.resolve(account_id)?.balance_type;
        let mut ids = vec![account_id];
        ids.extend(accounts.descendants_of(account_id));
        let book = locks::read(&self.book, wait, "ledger").await?;
        let (debit, credit) = rollup_totals(ids, &book.totals_by_account(as_of));
        Ok(AccountBalance::new(account_id, balance_type, debit, credit))
    }

    /// Trial balance through the last day of a period.
    ///
    /// Balances are cumulative: everything effective on or before the
    /// period end counts, not just the period's own activity.
    pub async fn trial_balance(&self, period_id: FiscalPeriodId) -> EngineResult<TrialBalance> {
        let end_date = {
            let periods = locks::read(&self.periods, self.lock_timeout(), "periods").await?;
            periods.period(period_id)?.end_date
        };
        self.trial_balance_as_of(end_date).await
    }

    /// Trial balance of every account with lines effective on or before `as_of`.
    pub async fn trial_balance_as_of(&self, as_of: NaiveDate) -> EngineResult<TrialBalance> {
        let wait = self.lock_timeout();
        let accounts = locks::read(&self.accounts, wait, "accounts").await?;
        let book = locks::read(&self.book, wait, "ledger").await?;
        let totals = book.totals_by_account(Some(as_of));
        let trial = TrialBalance::build(as_of, accounts.list(true), &totals);
        debug!(
            as_of = %as_of,
            rows = trial.rows.len(),
            balanced = trial.is_balanced(),
            "Trial balance built"
        );
        Ok(trial)
    }

    /// Lines of one account with an effective date in `[from, to]`.
    pub async fn account_activity(
        &self,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<JournalLine>> {
        let wait = self.lock_timeout();
        let accounts = locks::read(&self.accounts, wait, "accounts").await?;
        accounts.resolve(account_id)?;
        let book = locks::read(&self.book, wait, "ledger").await?;
        Ok(book.activity(account_id, from, to).into_iter().cloned().collect())
    }

    /// Net activity of every account of one type in `[from, to]`, on the
    /// type's normal side: total revenue, total expense and so on. Contra
    /// accounts of the type reduce the net.
    pub async fn net_for_type(
        &self,
        account_type: AccountType,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Decimal> {
        let wait = self.lock_timeout();
        let accounts = locks::read(&self.accounts, wait, "accounts").await?;
        let book = locks::read(&self.book, wait, "ledger").await?;
        let (debit, credit) = accounts
            .list(true)
            .into_iter()
            .filter(|a| a.account_type == account_type)
            .flat_map(|account| book.activity(account.id, from, to))
            .fold((Decimal::ZERO, Decimal::ZERO), |(d, c), l| (d + l.debit, c + l.credit));
        Ok(account_type.normal_balance().signed(debit, credit))
    }
}

/// Turns a book check into an early return: `Some` for a replay, an error
/// for a conflicting reuse, `None` when the request is fresh.
fn replay_or_reject(
    check: Result<CommitCheck<'_>, LedgerError>,
    request: &PostingRequest,
) -> EngineResult<Option<PostOutcome>> {
    match check {
        Ok(CommitCheck::Fresh) => Ok(None),
        Ok(CommitCheck::Replay(existing)) => {
            let receipt = PostingReceipt::from_lines(existing)
                .ok_or_else(|| LedgerError::ReferenceNotFound(request.reference.clone()))?;
            info!(reference = %request.reference, "Posting replayed, entry already committed");
            Ok(Some(PostOutcome::AlreadyPosted(receipt)))
        }
        Err(e) => {
            warn!(reference = %request.reference, error = %e, "Posting rejected");
            Err(EngineError::Ledger(e))
        }
    }
}

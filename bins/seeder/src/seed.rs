//! Seed file format.
//!
//! Accounts name their parent by account number; the seeder assigns ids and
//! resolves parents before loading the chart in one batch.

use std::collections::HashMap;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use folio_core::accounts::{Account, AccountType, BalanceType};
use folio_core::ledger::{PostingLine, PostingRequest, ReferenceTag};
use folio_engine::Engine;
use folio_shared::types::{AccountId, EmployeeId};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    /// Employee recorded as the actor of every seeded change.
    pub admin: EmployeeId,
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
    #[serde(default)]
    pub fiscal_years: Vec<SeedYear>,
    #[serde(default)]
    pub entries: Vec<SeedEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SeedAccount {
    pub number: String,
    pub name: String,
    pub account_type: AccountType,
    /// Defaults to the type's normal balance.
    #[serde(default)]
    pub balance_type: Option<BalanceType>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedYear {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SeedEntry {
    pub reference: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    pub lines: Vec<SeedLine>,
}

/// One side of an entry line; exactly one of `debit` and `credit` is set.
#[derive(Debug, Deserialize)]
pub struct SeedLine {
    pub account: String,
    #[serde(default)]
    pub debit: Option<Decimal>,
    #[serde(default)]
    pub credit: Option<Decimal>,
}

impl SeedFile {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let seed = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?
            .try_deserialize()?;
        Ok(seed)
    }

    /// Builds the chart with fresh ids and parents resolved by number.
    pub fn chart(&self) -> anyhow::Result<Vec<Account>> {
        let ids: HashMap<&str, AccountId> = self
            .accounts
            .iter()
            .map(|a| (a.number.as_str(), AccountId::new()))
            .collect();
        if ids.len() != self.accounts.len() {
            bail!("seed file lists an account number more than once");
        }

        self.accounts
            .iter()
            .map(|seed| {
                let parent_id = match &seed.parent {
                    Some(number) => Some(
                        *ids.get(number.as_str()).with_context(|| {
                            format!("account {} names unknown parent {number}", seed.number)
                        })?,
                    ),
                    None => None,
                };
                Ok(Account {
                    id: ids[seed.number.as_str()],
                    number: seed.number.clone(),
                    name: seed.name.clone(),
                    account_type: seed.account_type,
                    balance_type: seed
                        .balance_type
                        .unwrap_or_else(|| seed.account_type.normal_balance()),
                    parent_id,
                    description: seed.description.clone(),
                    is_active: true,
                })
            })
            .collect()
    }

    /// Turns an opening entry into a posting request against the loaded chart.
    pub async fn posting_request(
        &self,
        entry: &SeedEntry,
        engine: &Engine,
    ) -> anyhow::Result<PostingRequest> {
        let mut lines = Vec::with_capacity(entry.lines.len());
        for line in &entry.lines {
            let account = engine
                .account_by_number(&line.account)
                .await?
                .with_context(|| {
                    format!("entry {} names unknown account {}", entry.reference, line.account)
                })?;
            lines.push(match (line.debit, line.credit) {
                (Some(amount), None) => PostingLine::debit(account.id, amount),
                (None, Some(amount)) => PostingLine::credit(account.id, amount),
                _ => bail!(
                    "entry {} line on {} must set exactly one of debit and credit",
                    entry.reference,
                    line.account
                ),
            });
        }

        let reference = ReferenceTag::new(entry.reference.as_str())?;
        let mut request = PostingRequest::new(reference, entry.date, self.admin, lines);
        if let Some(description) = &entry.description {
            request = request.described(description.clone());
        }
        Ok(request)
    }
}

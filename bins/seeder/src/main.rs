//! Seeder for Folio development and testing.
//!
//! Loads the chart of accounts, fiscal years and opening entries from the
//! seed file into an in-process engine, then prints the resulting trial
//! balance.
//!
//! Usage: cargo run --bin seeder

mod seed;

use std::sync::Arc;

use anyhow::Context;
use folio_core::workflow::Role;
use folio_engine::{Engine, StaticRoleDirectory};
use folio_shared::AppConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::seed::SeedFile;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=debug,seeder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let seed = SeedFile::load(&config.seed.path)
        .with_context(|| format!("Failed to load seed file {}", config.seed.path))?;
    info!(
        path = %config.seed.path,
        accounts = seed.accounts.len(),
        fiscal_years = seed.fiscal_years.len(),
        entries = seed.entries.len(),
        "Seed file loaded"
    );

    let roles = Arc::new(StaticRoleDirectory::new().with(seed.admin, Role::Admin));
    let engine = Engine::builder(config.engine.clone()).roles(roles).build();

    let chart = seed.chart()?;
    let loaded = engine.load_chart(chart, seed.admin).await?;
    info!(count = loaded, "Seeded chart of accounts");

    for year in &seed.fiscal_years {
        let (fiscal_year, periods) = engine
            .create_fiscal_year(&year.name, year.start_date, year.end_date, seed.admin)
            .await?;
        info!(name = %fiscal_year.name, periods = periods.len(), "Seeded fiscal year");
    }

    let mut last_date = None;
    for entry in &seed.entries {
        let request = seed.posting_request(entry, &engine).await?;
        let outcome = engine.post(request).await?;
        info!(reference = %outcome.receipt().reference, "Seeded opening entry");
        last_date = last_date.max(Some(entry.date));
    }

    if let Some(as_of) = last_date {
        let trial = engine.trial_balance_as_of(as_of).await?;
        println!("Trial balance as of {as_of}");
        for row in &trial.rows {
            println!(
                "  {:<8} {:<32} {:>14} {:>14}",
                row.number, row.name, row.debit, row.credit
            );
        }
        println!("  {:<41} {:>14} {:>14}", "Total", trial.total_debit, trial.total_credit);
    }

    println!("Seeding complete!");
    Ok(())
}

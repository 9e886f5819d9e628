//! Database seeder for Tally development and demos.
//!
//! Seeds a demo company, the default chart of accounts, and a handful of
//! posted transactions. Running it again leaves an existing demo company
//! untouched.
//!
//! Usage: cargo run --bin seeder

mod chart;

use std::collections::HashMap;

use anyhow::{Context, bail};
use tally_core::ledger::{Company, LedgerStoreError, NewTransaction};
use tally_db::{AccountRepository, LedgerRepository, RepositoryError};
use tally_shared::AppConfig;
use tally_shared::types::{AccountId, CompanyId};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use chart::{DEFAULT_CHART, SAMPLE_POSTINGS};

/// Demo company ID (consistent across runs).
const DEMO_COMPANY_ID: Uuid = Uuid::from_u128(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_with_dotenv().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = tally_db::connect_with(&config.database).await?;
    info!("Connected to database");

    let ledger = LedgerRepository::new(db.clone());
    let accounts = AccountRepository::new(db);
    let company_id = CompanyId::from_uuid(DEMO_COMPANY_ID);

    match ledger.find_company(company_id).await {
        Ok(company) => {
            info!(company = %company.name, "Demo company already exists, skipping");
            return Ok(());
        }
        Err(RepositoryError::Store(LedgerStoreError::CompanyNotFound(_))) => {}
        Err(err) => return Err(err.into()),
    }

    let company = Company {
        id: company_id,
        name: "Acme Corporation".to_string(),
        currency: config.reports.default_currency,
    };
    ledger.create_company(&company).await?;
    info!(company = %company.name, currency = %company.currency, "Created demo company");

    let mut by_code: HashMap<&str, AccountId> = HashMap::with_capacity(DEFAULT_CHART.len());
    for entry in DEFAULT_CHART {
        let account = accounts.create(entry.to_input(company_id)).await?;
        by_code.insert(entry.code, account.id);
    }
    info!(count = by_code.len(), "Created chart of accounts");

    for posting in SAMPLE_POSTINGS {
        let (Some(debit), Some(credit)) = (by_code.get(posting.debit), by_code.get(posting.credit))
        else {
            bail!("Sample posting '{}' references an unknown account", posting.description);
        };
        let Some(date) = posting.date() else {
            bail!("Sample posting '{}' has an invalid date", posting.description);
        };
        let input = NewTransaction::new(company_id, date, posting.description)
            .reference(posting.reference)
            .line(*debit, posting.amount())
            .line(*credit, -posting.amount())
            .posted();
        ledger.record_transaction(input).await?;
    }
    info!(count = SAMPLE_POSTINGS.len(), "Posted sample transactions");

    info!(%company_id, "Seeding complete");
    Ok(())
}

//! Tally statement reporter.
//!
//! Loads one company's ledger from the database and prints a statement as
//! pretty JSON on stdout. Logs go to stderr.
//!
//! Usage:
//!   reporter <company-id> pnl --from 2024-01-01 --to 2024-03-31
//!   reporter <company-id> balance-sheet --as-of 2024-03-31 --rounded
//!   reporter <company-id> cash-flow --from 2024-01-01 --to 2024-03-31
//!   reporter <company-id> trend --kind revenue --interval month --from 2024-01-01 --to 2024-12-31

mod cli;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tally_core::StatementEngine;
use tally_db::LedgerRepository;
use tally_shared::AppConfig;
use tally_shared::config::LoggingConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Report};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config = AppConfig::load_with_dotenv().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = tally_db::connect_with(&config.database).await?;
    let repository = LedgerRepository::new(db);
    let engine = StatementEngine::new(config.reports.clone());

    let snapshot = repository
        .load_snapshot(args.company_id, args.report.through())
        .await?;
    info!(company_id = %args.company_id, report = args.report.name(), "Generating report");

    let company = args.company_id;
    let json = match args.report {
        Report::Pnl { from, to } => {
            let report = engine.profit_and_loss(&snapshot, company, from, to)?;
            render(&report, args.rounded.then(|| report.for_presentation()))
        }
        Report::BalanceSheet { as_of } => {
            let report = engine.balance_sheet(&snapshot, company, as_of)?;
            render(&report, args.rounded.then(|| report.for_presentation()))
        }
        Report::CashFlow { from, to } => {
            let report = engine.cash_flow(&snapshot, company, from, to)?;
            render(&report, args.rounded.then(|| report.for_presentation()))
        }
        Report::Trend {
            kind,
            interval,
            from,
            to,
        } => {
            let report = engine.trend(&snapshot, company, kind, from, to, interval)?;
            render(&report, args.rounded.then(|| report.for_presentation()))
        }
        Report::Chart => {
            let tree = engine.hierarchy(&snapshot, company)?;
            serde_json::to_string_pretty(&tree.forest())
        }
        Report::Balance { account_id } => {
            let detail = engine.account_balance(&snapshot, company, account_id, None)?;
            serde_json::to_string_pretty(&detail)
        }
        Report::Summary => {
            let summary = engine.type_summary(&snapshot, company)?;
            serde_json::to_string_pretty(&summary)
        }
    }?;

    println!("{json}");
    Ok(())
}

/// Serializes the presentation copy when one was requested.
fn render<T: Serialize>(report: &T, presented: Option<T>) -> serde_json::Result<String> {
    match presented {
        Some(rounded) => serde_json::to_string_pretty(&rounded),
        None => serde_json::to_string_pretty(report),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

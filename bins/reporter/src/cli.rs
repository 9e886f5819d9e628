//! Command-line arguments.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tally_core::reports::{Interval, TrendKind};
use tally_shared::types::{AccountId, CompanyId};

/// Print a financial statement for one company as JSON.
#[derive(Debug, Parser)]
#[command(name = "reporter", version, about)]
pub struct Cli {
    /// Company to report on.
    pub company_id: CompanyId,

    /// Round every amount to 2 places (banker's rounding).
    #[arg(long, global = true)]
    pub rounded: bool,

    #[command(subcommand)]
    pub report: Report,
}

#[derive(Debug, Subcommand)]
pub enum Report {
    /// Profit and loss over an inclusive date range.
    Pnl {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Balance sheet as of a date (inclusive).
    BalanceSheet {
        #[arg(long)]
        as_of: NaiveDate,
    },
    /// Cash flow statement over an inclusive date range.
    CashFlow {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Revenue, expense, or cash flow amounts bucketed by interval.
    Trend {
        #[arg(long)]
        kind: TrendKind,
        #[arg(long, default_value = "month")]
        interval: Interval,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Active chart of accounts as a tree.
    Chart,
    /// Stored and computed balance for one account.
    Balance {
        #[arg(long)]
        account_id: AccountId,
    },
    /// Account count and total per account type.
    Summary,
}

impl Report {
    /// Last transaction date the report can see, if bounded.
    pub const fn through(&self) -> Option<NaiveDate> {
        match self {
            Self::Pnl { to, .. } | Self::CashFlow { to, .. } | Self::Trend { to, .. } => Some(*to),
            Self::BalanceSheet { as_of } => Some(*as_of),
            Self::Chart | Self::Balance { .. } | Self::Summary => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pnl { .. } => "pnl",
            Self::BalanceSheet { .. } => "balance-sheet",
            Self::CashFlow { .. } => "cash-flow",
            Self::Trend { .. } => "trend",
            Self::Chart => "chart",
            Self::Balance { .. } => "balance",
            Self::Summary => "summary",
        }
    }
}

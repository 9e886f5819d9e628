//! Core ledger and statement logic for Tally.
//!
//! This crate contains pure business logic with no web or database dependencies.
//! Persistence is reached through the [`ledger::LedgerSource`] trait.
//!
//! # Modules
//!
//! - `account` - Chart of accounts and account write rules
//! - `ledger` - Companies, transactions, ledger lines, and the line store seam
//! - `hierarchy` - Account trees built from parent links
//! - `balance` - Balance accumulation and cached account balances
//! - `reports` - Profit and loss, balance sheet, cash flow, and trends

pub mod account;
pub mod balance;
pub mod error;
pub mod hierarchy;
pub mod ledger;
pub mod reports;

pub use error::ErrorKind;
pub use reports::{ReportError, StatementEngine};

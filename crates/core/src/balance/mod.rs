//! Balance accumulation.
//!
//! - Per-account debit/credit/net sums, sequential or parallel
//! - Balance queries for an account set and period
//! - Account balance detail with stored-balance drift detection
//! - Per-type summaries
//! - A revision-keyed cache of computed balances

pub mod accumulator;
pub mod cache;
pub mod service;

pub use accumulator::{
    AccountActivity, BalanceAccumulator, Balances, accumulate, accumulate_parallel,
};
pub use cache::{BalanceCache, BalanceKey};
pub use service::{AccountBalance, BalanceService, TypeSummary, balance};

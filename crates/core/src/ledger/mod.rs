//! Ledger line store.
//!
//! - Company context and transaction headers
//! - Signed ledger lines and the balance check
//! - Date windows for queries
//! - The read interface consumed by reports
//! - An in-memory store implementing it

pub mod company;
pub mod error;
pub mod line;
pub mod period;
pub mod snapshot;
pub mod store;
pub mod transaction;

#[cfg(test)]
mod snapshot_props;

pub use company::Company;
pub use error::LedgerStoreError;
pub use line::{LedgerLine, transaction_imbalance};
pub use period::Period;
pub use snapshot::LedgerSnapshot;
pub use store::LedgerSource;
pub use transaction::{LineInput, NewTransaction, Transaction, TransactionStatus};

//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod error;
pub mod ledger;
mod mapping;

pub use account::AccountRepository;
pub use error::RepositoryError;
pub use ledger::LedgerRepository;

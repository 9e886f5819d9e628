//! Read interface the statement engine consumes.

use tally_shared::types::{AccountId, CompanyId, TransactionId};

use super::company::Company;
use super::error::LedgerStoreError;
use super::line::LedgerLine;
use super::period::Period;
use super::transaction::Transaction;
use crate::account::{Account, AccountFilter};

/// Read-only access to a company's chart of accounts and posted ledger.
///
/// Implementations only ever return lines of posted transactions, in
/// insertion order. `Sync` lets one source serve parallel report requests.
pub trait LedgerSource: Sync {
    /// Resolves the company context.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` if the company does not exist.
    fn company(&self, company_id: CompanyId) -> Result<Company, LedgerStoreError>;

    /// Returns the company's accounts that match `filter`.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` if the company does not exist.
    fn fetch_accounts(
        &self,
        company_id: CompanyId,
        filter: &AccountFilter,
    ) -> Result<Vec<Account>, LedgerStoreError>;

    /// Returns posted lines against `account_ids` dated within `period`.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` if the company does not exist.
    fn fetch_posted_lines(
        &self,
        company_id: CompanyId,
        account_ids: &[AccountId],
        period: &Period,
    ) -> Result<Vec<LedgerLine>, LedgerStoreError>;

    /// Returns posted lines dated within `period` whose account is not in the
    /// company's chart.
    ///
    /// A well-formed ledger returns nothing here.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` if the company does not exist.
    fn fetch_unresolved_lines(
        &self,
        company_id: CompanyId,
        period: &Period,
    ) -> Result<Vec<LedgerLine>, LedgerStoreError>;

    /// Returns every line of the given posted transactions.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` if the company does not exist.
    fn fetch_transaction_lines(
        &self,
        company_id: CompanyId,
        transaction_ids: &[TransactionId],
    ) -> Result<Vec<LedgerLine>, LedgerStoreError>;

    /// Returns the headers of the given transactions.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` if the company does not exist.
    fn fetch_transactions(
        &self,
        company_id: CompanyId,
        transaction_ids: &[TransactionId],
    ) -> Result<Vec<Transaction>, LedgerStoreError>;

    /// Returns a counter that changes on every write to the company's ledger.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` if the company does not exist.
    fn revision(&self, company_id: CompanyId) -> Result<u64, LedgerStoreError>;
}

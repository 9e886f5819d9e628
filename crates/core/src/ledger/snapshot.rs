//! In-memory ledger store.
//!
//! The persistence layer loads one snapshot per report request; tests and
//! the seeder build them directly through the write methods below.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use tally_shared::types::{AccountId, CompanyId, LedgerLineId, TransactionId};
use tracing::{debug, warn};

use super::company::Company;
use super::error::LedgerStoreError;
use super::line::{LedgerLine, transaction_imbalance};
use super::period::Period;
use super::store::LedgerSource;
use super::transaction::{NewTransaction, Transaction, TransactionStatus};
use crate::account::{
    Account, AccountError, AccountFilter, AccountPatch, DeletionOutcome, NewAccount, validation,
};

/// Revisions are drawn from one process-wide counter, so separately loaded
/// snapshots of the same company never report the same revision once either
/// has been written to.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
struct Book {
    company: Company,
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    transaction_index: HashMap<TransactionId, usize>,
    lines: Vec<LedgerLine>,
    revision: u64,
}

impl Book {
    fn new(company: Company) -> Self {
        Self {
            company,
            accounts: Vec::new(),
            transactions: Vec::new(),
            transaction_index: HashMap::new(),
            lines: Vec::new(),
            revision: next_revision(),
        }
    }

    fn touch(&mut self) {
        self.revision = next_revision();
    }

    fn is_posted(&self, transaction_id: TransactionId) -> bool {
        self.transaction_index
            .get(&transaction_id)
            .is_some_and(|&idx| self.transactions[idx].status.is_posted())
    }

    fn account_position(&self, account_id: AccountId) -> Result<usize, AccountError> {
        self.accounts
            .iter()
            .position(|a| a.id == account_id)
            .ok_or(AccountError::AccountNotFound(account_id))
    }

    fn transaction_mut(
        &mut self,
        transaction_id: TransactionId,
    ) -> Result<&mut Transaction, LedgerStoreError> {
        let idx = *self
            .transaction_index
            .get(&transaction_id)
            .ok_or(LedgerStoreError::TransactionNotFound(transaction_id))?;
        Ok(&mut self.transactions[idx])
    }

    fn line_count(&self, account_id: AccountId) -> u64 {
        self.lines.iter().filter(|l| l.account_id == account_id).count() as u64
    }

    /// Adds (`sign = 1`) or removes (`sign = -1`) a transaction's lines from
    /// the stored account balances.
    fn apply_to_balances(&mut self, transaction_id: TransactionId, sign: Decimal) {
        let mut deltas: HashMap<AccountId, Decimal> = HashMap::new();
        for line in self.lines.iter().filter(|l| l.transaction_id == transaction_id) {
            *deltas.entry(line.account_id).or_default() += line.amount * sign;
        }
        for account in &mut self.accounts {
            if let Some(delta) = deltas.get(&account.id) {
                account.current_balance += *delta;
            }
        }
    }

    fn warn_if_unbalanced(&self, transaction_id: TransactionId) {
        let imbalance = transaction_imbalance(
            self.lines
                .iter()
                .filter(|l| l.transaction_id == transaction_id),
        );
        if !imbalance.is_zero() {
            warn!(
                company_id = %self.company.id,
                transaction_id = %transaction_id,
                imbalance = %imbalance,
                "Posting unbalanced transaction"
            );
        }
    }
}

/// In-memory ledger for one or more companies.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    books: HashMap<CompanyId, Book>,
}

impl LedgerSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a company, or replaces its header if already present.
    pub fn insert_company(&mut self, company: Company) {
        match self.books.get_mut(&company.id) {
            Some(book) => {
                book.company = company;
                book.touch();
            }
            None => {
                self.books.insert(company.id, Book::new(company));
            }
        }
    }

    /// Adds an already-persisted account without validation.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` if the account's company is unknown.
    pub fn insert_account(&mut self, account: Account) -> Result<(), LedgerStoreError> {
        let book = self.book_mut(account.company_id)?;
        book.accounts.push(account);
        book.touch();
        Ok(())
    }

    /// Adds an already-persisted transaction and its lines.
    ///
    /// Stored account balances are left untouched, and lines are not checked
    /// against the chart, so integrity faults surface at report time.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` if the transaction's company is unknown.
    pub fn load_transaction(
        &mut self,
        transaction: Transaction,
        lines: Vec<LedgerLine>,
    ) -> Result<(), LedgerStoreError> {
        let book = self.book_mut(transaction.company_id)?;
        book.transaction_index
            .insert(transaction.id, book.transactions.len());
        book.transactions.push(transaction);
        book.lines.extend(lines);
        book.touch();
        Ok(())
    }

    /// Returns an account by id.
    #[must_use]
    pub fn account(&self, company_id: CompanyId, account_id: AccountId) -> Option<&Account> {
        self.books
            .get(&company_id)
            .and_then(|book| book.accounts.iter().find(|a| a.id == account_id))
    }

    /// Returns a transaction header by id.
    #[must_use]
    pub fn transaction(
        &self,
        company_id: CompanyId,
        transaction_id: TransactionId,
    ) -> Option<&Transaction> {
        let book = self.books.get(&company_id)?;
        book.transaction_index
            .get(&transaction_id)
            .map(|&idx| &book.transactions[idx])
    }

    /// Returns the number of lines (any status) referencing an account.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` if the company is unknown.
    pub fn line_count(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<u64, LedgerStoreError> {
        Ok(self.book(company_id)?.line_count(account_id))
    }

    /// Validates and adds a new account.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` or any `AccountError` from validation.
    pub fn create_account(&mut self, input: NewAccount) -> Result<Account, LedgerStoreError> {
        let book = self.book_mut(input.company_id)?;
        let account = validation::create_account(input, book.company.currency, &book.accounts)?;
        book.accounts.push(account.clone());
        book.touch();
        debug!(account_id = %account.id, code = %account.code, "Account created");
        Ok(account)
    }

    /// Validates and applies a patch to an account.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound`, `AccountNotFound`, or any validation error.
    pub fn update_account(
        &mut self,
        company_id: CompanyId,
        account_id: AccountId,
        patch: &AccountPatch,
    ) -> Result<Account, LedgerStoreError> {
        let book = self.book_mut(company_id)?;
        let idx = book.account_position(account_id)?;
        let has_postings = book.line_count(account_id) > 0;
        let updated =
            validation::apply_patch(&book.accounts[idx], patch, &book.accounts, has_postings)?;
        book.accounts[idx] = updated.clone();
        book.touch();
        Ok(updated)
    }

    /// Deletes an account, or deactivates it when lines reference it.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound`, `AccountNotFound`, or
    /// `SystemAccountUndeletable`.
    pub fn delete_account(
        &mut self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<DeletionOutcome, LedgerStoreError> {
        let book = self.book_mut(company_id)?;
        let idx = book.account_position(account_id)?;
        let outcome = validation::plan_deletion(&book.accounts[idx], book.line_count(account_id))?;
        match outcome {
            DeletionOutcome::Deleted => {
                book.accounts.remove(idx);
            }
            DeletionOutcome::Deactivated => book.accounts[idx].is_active = false,
        }
        book.touch();
        debug!(account_id = %account_id, ?outcome, "Account deletion handled");
        Ok(outcome)
    }

    /// Records a transaction with its lines.
    ///
    /// Every line must reference an account of the company. Unbalanced
    /// transactions are accepted and logged. When recorded as posted, the
    /// stored account balances are updated in the same call.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound`, `EmptyTransaction`, or `AccountNotFound`.
    pub fn record_transaction(
        &mut self,
        input: NewTransaction,
    ) -> Result<TransactionId, LedgerStoreError> {
        let company_id = input.company_id;
        let book = self.book_mut(company_id)?;

        if input.lines.is_empty() {
            return Err(LedgerStoreError::EmptyTransaction);
        }
        if let Some(missing) = input
            .lines
            .iter()
            .find(|line| !book.accounts.iter().any(|a| a.id == line.account_id))
        {
            return Err(LedgerStoreError::AccountNotFound {
                company: company_id,
                account: missing.account_id,
            });
        }

        let transaction = Transaction {
            id: TransactionId::new(),
            company_id,
            date: input.date,
            description: input.description,
            reference: input.reference,
            status: input.status,
        };
        let transaction_id = transaction.id;

        book.lines.extend(input.lines.into_iter().map(|line| LedgerLine {
            id: LedgerLineId::new(),
            transaction_id,
            account_id: line.account_id,
            amount: line.amount,
            date: transaction.date,
            description: line.description,
        }));
        book.transaction_index
            .insert(transaction_id, book.transactions.len());
        book.transactions.push(transaction);

        if input.status.is_posted() {
            book.warn_if_unbalanced(transaction_id);
            book.apply_to_balances(transaction_id, Decimal::ONE);
        }
        book.touch();

        debug!(transaction_id = %transaction_id, status = %input.status, "Transaction recorded");
        Ok(transaction_id)
    }

    /// Moves a draft transaction to posted and applies it to account balances.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` or `InvalidTransition`.
    pub fn post_transaction(
        &mut self,
        company_id: CompanyId,
        transaction_id: TransactionId,
    ) -> Result<(), LedgerStoreError> {
        let book = self.book_mut(company_id)?;
        let transaction = book.transaction_mut(transaction_id)?;
        if !transaction.can_post() {
            return Err(LedgerStoreError::InvalidTransition {
                id: transaction_id,
                from: transaction.status,
                to: TransactionStatus::Posted,
            });
        }
        transaction.status = TransactionStatus::Posted;

        book.warn_if_unbalanced(transaction_id);
        book.apply_to_balances(transaction_id, Decimal::ONE);
        book.touch();
        Ok(())
    }

    /// Voids a draft or posted transaction, reversing its balance effect.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` or `InvalidTransition`.
    pub fn void_transaction(
        &mut self,
        company_id: CompanyId,
        transaction_id: TransactionId,
    ) -> Result<(), LedgerStoreError> {
        let book = self.book_mut(company_id)?;
        let transaction = book.transaction_mut(transaction_id)?;
        if !transaction.can_void() {
            return Err(LedgerStoreError::InvalidTransition {
                id: transaction_id,
                from: transaction.status,
                to: TransactionStatus::Voided,
            });
        }
        let was_posted = transaction.status.is_posted();
        transaction.status = TransactionStatus::Voided;

        if was_posted {
            book.apply_to_balances(transaction_id, Decimal::NEGATIVE_ONE);
        }
        book.touch();
        Ok(())
    }

    fn book(&self, company_id: CompanyId) -> Result<&Book, LedgerStoreError> {
        self.books
            .get(&company_id)
            .ok_or(LedgerStoreError::CompanyNotFound(company_id))
    }

    fn book_mut(&mut self, company_id: CompanyId) -> Result<&mut Book, LedgerStoreError> {
        self.books
            .get_mut(&company_id)
            .ok_or(LedgerStoreError::CompanyNotFound(company_id))
    }
}

impl LedgerSource for LedgerSnapshot {
    fn company(&self, company_id: CompanyId) -> Result<Company, LedgerStoreError> {
        Ok(self.book(company_id)?.company.clone())
    }

    fn fetch_accounts(
        &self,
        company_id: CompanyId,
        filter: &AccountFilter,
    ) -> Result<Vec<Account>, LedgerStoreError> {
        Ok(self
            .book(company_id)?
            .accounts
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }

    fn fetch_posted_lines(
        &self,
        company_id: CompanyId,
        account_ids: &[AccountId],
        period: &Period,
    ) -> Result<Vec<LedgerLine>, LedgerStoreError> {
        let book = self.book(company_id)?;
        let wanted: HashSet<AccountId> = account_ids.iter().copied().collect();
        Ok(book
            .lines
            .iter()
            .filter(|l| {
                wanted.contains(&l.account_id)
                    && period.contains(l.date)
                    && book.is_posted(l.transaction_id)
            })
            .cloned()
            .collect())
    }

    fn fetch_unresolved_lines(
        &self,
        company_id: CompanyId,
        period: &Period,
    ) -> Result<Vec<LedgerLine>, LedgerStoreError> {
        let book = self.book(company_id)?;
        let known: HashSet<AccountId> = book.accounts.iter().map(|a| a.id).collect();
        Ok(book
            .lines
            .iter()
            .filter(|l| {
                !known.contains(&l.account_id)
                    && period.contains(l.date)
                    && book.is_posted(l.transaction_id)
            })
            .cloned()
            .collect())
    }

    fn fetch_transaction_lines(
        &self,
        company_id: CompanyId,
        transaction_ids: &[TransactionId],
    ) -> Result<Vec<LedgerLine>, LedgerStoreError> {
        let book = self.book(company_id)?;
        let wanted: HashSet<TransactionId> = transaction_ids.iter().copied().collect();
        Ok(book
            .lines
            .iter()
            .filter(|l| wanted.contains(&l.transaction_id) && book.is_posted(l.transaction_id))
            .cloned()
            .collect())
    }

    fn fetch_transactions(
        &self,
        company_id: CompanyId,
        transaction_ids: &[TransactionId],
    ) -> Result<Vec<Transaction>, LedgerStoreError> {
        let book = self.book(company_id)?;
        Ok(transaction_ids
            .iter()
            .filter_map(|id| book.transaction_index.get(id))
            .map(|&idx| book.transactions[idx].clone())
            .collect())
    }

    fn revision(&self, company_id: CompanyId) -> Result<u64, LedgerStoreError> {
        Ok(self.book(company_id)?.revision)
    }
}

//! Account repository for chart of accounts database operations.
//!
//! Every write loads the company's chart inside a database transaction and
//! runs the core account rules against it before touching a row.

use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tally_core::account::{
    self, Account, AccountError, AccountFilter, AccountPatch, DeletionOutcome, NewAccount,
};
use tally_core::ledger::LedgerStoreError;
use tally_shared::types::{AccountId, CompanyId, PageRequest, PageResponse};
use tracing::debug;

use super::error::RepositoryError;
use super::mapping;
use crate::entities::{accounts, companies, transaction_lines};

/// Account repository for CRUD operations.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a company's accounts matching `filter`, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        company_id: CompanyId,
        filter: &AccountFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Account>, RepositoryError> {
        let chart = load_chart(&self.db, company_id).await?;
        Ok(account::list_accounts(&chart, filter, page))
    }

    /// Finds an account by id.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a database error.
    pub async fn find(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<Account, RepositoryError> {
        let model = accounts::Entity::find_by_id(account_id.into_inner())
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(AccountError::AccountNotFound(account_id))?;
        Ok(mapping::account(model)?)
    }

    /// Creates an account after validating it against the company's chart.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound`, any account rule violation, or a database error.
    pub async fn create(&self, input: NewAccount) -> Result<Account, RepositoryError> {
        let txn = self.db.begin().await?;

        let company = companies::Entity::find_by_id(input.company_id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerStoreError::CompanyNotFound(input.company_id))?;
        let company = mapping::company(company)?;

        let chart = load_chart(&txn, company.id).await?;
        let account = account::create_account(input, company.currency, &chart)?;
        let model = mapping::new_account(&account).insert(&txn).await?;

        txn.commit().await?;
        debug!(account_id = %account.id, code = %account.code, "Account created");
        Ok(mapping::account(model)?)
    }

    /// Applies a patch to an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, any account rule violation, or a database error.
    pub async fn update(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
        patch: &AccountPatch,
    ) -> Result<Account, RepositoryError> {
        let txn = self.db.begin().await?;

        let chart = load_chart(&txn, company_id).await?;
        let current = chart
            .iter()
            .find(|a| a.id == account_id)
            .ok_or(AccountError::AccountNotFound(account_id))?;
        let has_postings = line_count(&txn, account_id).await? > 0;
        let updated = account::apply_patch(current, patch, &chart, has_postings)?;

        let mut active = accounts::ActiveModel {
            id: Unchanged(account_id.into_inner()),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        mapping::write_account(&mut active, &updated);
        let model = active.update(&txn).await?;

        txn.commit().await?;
        Ok(mapping::account(model)?)
    }

    /// Deletes an account, or deactivates it when lines reference it.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, `SystemAccountUndeletable`, or a database error.
    pub async fn delete(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<DeletionOutcome, RepositoryError> {
        let txn = self.db.begin().await?;

        let model = accounts::Entity::find_by_id(account_id.into_inner())
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
            .one(&txn)
            .await?
            .ok_or(AccountError::AccountNotFound(account_id))?;
        let current = mapping::account(model)?;
        let outcome = account::plan_deletion(&current, line_count(&txn, account_id).await?)?;

        match outcome {
            DeletionOutcome::Deleted => {
                accounts::Entity::delete_by_id(account_id.into_inner())
                    .exec(&txn)
                    .await?;
            }
            DeletionOutcome::Deactivated => {
                accounts::Entity::update_many()
                    .set(accounts::ActiveModel {
                        is_active: Set(false),
                        updated_at: Set(chrono::Utc::now().into()),
                        ..Default::default()
                    })
                    .filter(accounts::Column::Id.eq(account_id.into_inner()))
                    .exec(&txn)
                    .await?;
            }
        }

        txn.commit().await?;
        debug!(%account_id, ?outcome, "Account deletion handled");
        Ok(outcome)
    }
}

async fn load_chart<C: ConnectionTrait>(
    db: &C,
    company_id: CompanyId,
) -> Result<Vec<Account>, RepositoryError> {
    let models = accounts::Entity::find()
        .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
        .order_by_asc(accounts::Column::Code)
        .all(db)
        .await?;
    models
        .into_iter()
        .map(|m| mapping::account(m).map_err(RepositoryError::from))
        .collect()
}

/// Counts lines of any status that reference an account.
async fn line_count<C: ConnectionTrait>(
    db: &C,
    account_id: AccountId,
) -> Result<u64, RepositoryError> {
    Ok(transaction_lines::Entity::find()
        .filter(transaction_lines::Column::AccountId.eq(account_id.into_inner()))
        .count(db)
        .await?)
}

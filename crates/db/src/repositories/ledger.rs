//! Ledger repository: companies, transactions, and report snapshots.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tally_core::ledger::{
    Company, LedgerSnapshot, LedgerStoreError, NewTransaction, TransactionStatus,
};
use tally_shared::types::{CompanyId, LedgerLineId, TransactionId};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::error::RepositoryError;
use super::mapping;
use crate::entities::{
    accounts, companies, sea_orm_active_enums::TransactionStatus as DbTransactionStatus,
    transaction_lines, transactions,
};

/// Ledger repository.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a company by id.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` or a database error.
    pub async fn find_company(&self, company_id: CompanyId) -> Result<Company, RepositoryError> {
        let model = companies::Entity::find_by_id(company_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(LedgerStoreError::CompanyNotFound(company_id))?;
        Ok(mapping::company(model)?)
    }

    /// Inserts a company.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_company(&self, company: &Company) -> Result<Company, RepositoryError> {
        let now = chrono::Utc::now().into();
        let model = companies::ActiveModel {
            id: Set(company.id.into_inner()),
            name: Set(company.name.clone()),
            currency: Set(company.currency.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(mapping::company(model)?)
    }

    /// Loads a company's chart and posted transactions into a snapshot.
    ///
    /// Transactions dated after `through` are left out. Lines keep the order
    /// they were written in, and transactions are ordered by date then
    /// creation time.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound`, a store error for unreadable rows, or a
    /// database error.
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn load_snapshot(
        &self,
        company_id: CompanyId,
        through: Option<NaiveDate>,
    ) -> Result<LedgerSnapshot, RepositoryError> {
        let company = self.find_company(company_id).await?;
        let company_uuid = company_id.into_inner();

        let account_models = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_uuid))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        let mut header_query = transactions::Entity::find()
            .filter(transactions::Column::CompanyId.eq(company_uuid))
            .filter(transactions::Column::Status.eq(DbTransactionStatus::Posted));
        if let Some(through) = through {
            header_query = header_query.filter(transactions::Column::TransactionDate.lte(through));
        }
        let headers = header_query
            .order_by_asc(transactions::Column::TransactionDate)
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(transactions::Column::Id)
            .all(&self.db)
            .await?;

        let mut line_query = transaction_lines::Entity::find()
            .inner_join(transactions::Entity)
            .filter(transaction_lines::Column::CompanyId.eq(company_uuid))
            .filter(transactions::Column::Status.eq(DbTransactionStatus::Posted));
        if let Some(through) = through {
            line_query = line_query.filter(transactions::Column::TransactionDate.lte(through));
        }
        let line_models = line_query
            .order_by_asc(transaction_lines::Column::CreatedAt)
            .order_by_asc(transaction_lines::Column::Id)
            .all(&self.db)
            .await?;

        let mut lines_by_transaction: HashMap<Uuid, Vec<transaction_lines::Model>> =
            HashMap::with_capacity(headers.len());
        for line in line_models {
            lines_by_transaction
                .entry(line.transaction_id)
                .or_default()
                .push(line);
        }

        let mut snapshot = LedgerSnapshot::new();
        snapshot.insert_company(company);
        let account_count = account_models.len();
        for model in account_models {
            snapshot.insert_account(mapping::account(model)?)?;
        }

        let mut line_count = 0usize;
        for header in &headers {
            let lines: Vec<_> = lines_by_transaction
                .remove(&header.id)
                .unwrap_or_default()
                .into_iter()
                .map(|line| mapping::line(line, header.transaction_date))
                .collect();
            line_count += lines.len();
            snapshot.load_transaction(mapping::transaction(header), lines)?;
        }
        if !lines_by_transaction.is_empty() {
            warn!(
                orphaned = lines_by_transaction.len(),
                "Posted lines without a loaded transaction header were skipped"
            );
        }

        debug!(
            accounts = account_count,
            transactions = headers.len(),
            lines = line_count,
            "Ledger snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Records a transaction and its lines.
    ///
    /// The header and lines are written as a draft; when `input` is posted the
    /// status is then switched, which lets the database apply balances and
    /// reject an unbalanced posting inside the same database transaction.
    ///
    /// # Errors
    ///
    /// Returns `EmptyTransaction`, `AccountNotFound`, or a database error.
    #[instrument(skip_all, fields(company_id = %input.company_id))]
    pub async fn record_transaction(
        &self,
        input: NewTransaction,
    ) -> Result<TransactionId, RepositoryError> {
        if input.lines.is_empty() {
            return Err(LedgerStoreError::EmptyTransaction.into());
        }
        let company_uuid = input.company_id.into_inner();
        let wanted: Vec<Uuid> = input
            .lines
            .iter()
            .map(|l| l.account_id.into_inner())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let txn = self.db.begin().await?;

        let known: HashSet<Uuid> = accounts::Entity::find()
            .select_only()
            .column(accounts::Column::Id)
            .filter(accounts::Column::CompanyId.eq(company_uuid))
            .filter(accounts::Column::Id.is_in(wanted))
            .into_tuple::<Uuid>()
            .all(&txn)
            .await?
            .into_iter()
            .collect();
        if let Some(missing) = input
            .lines
            .iter()
            .find(|l| !known.contains(&l.account_id.into_inner()))
        {
            return Err(LedgerStoreError::AccountNotFound {
                company: input.company_id,
                account: missing.account_id,
            }
            .into());
        }

        let now = chrono::Utc::now().into();
        let transaction_id = TransactionId::new();
        transactions::ActiveModel {
            id: Set(transaction_id.into_inner()),
            company_id: Set(company_uuid),
            transaction_date: Set(input.date),
            description: Set(input.description.clone()),
            reference: Set(input.reference.clone()),
            status: Set(DbTransactionStatus::Draft),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let lines = input.lines.iter().map(|line| transaction_lines::ActiveModel {
            id: Set(LedgerLineId::new().into_inner()),
            transaction_id: Set(transaction_id.into_inner()),
            company_id: Set(company_uuid),
            account_id: Set(line.account_id.into_inner()),
            amount: Set(line.amount),
            description: Set(line.description.clone()),
            created_at: Set(now),
        });
        transaction_lines::Entity::insert_many(lines)
            .exec_without_returning(&txn)
            .await?;

        if input.status != TransactionStatus::Draft {
            set_status(&txn, transaction_id, input.status).await?;
        }

        txn.commit().await?;
        debug!(%transaction_id, status = %input.status, "Transaction recorded");
        Ok(transaction_id)
    }

    /// Posts a draft transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `InvalidTransition`, or a database
    /// error (including the rejection of an unbalanced posting).
    pub async fn post_transaction(
        &self,
        company_id: CompanyId,
        transaction_id: TransactionId,
    ) -> Result<(), RepositoryError> {
        self.transition(company_id, transaction_id, TransactionStatus::Posted)
            .await
    }

    /// Voids a draft or posted transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `InvalidTransition`, or a database error.
    pub async fn void_transaction(
        &self,
        company_id: CompanyId,
        transaction_id: TransactionId,
    ) -> Result<(), RepositoryError> {
        self.transition(company_id, transaction_id, TransactionStatus::Voided)
            .await
    }

    async fn transition(
        &self,
        company_id: CompanyId,
        transaction_id: TransactionId,
        to: TransactionStatus,
    ) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        let header = transactions::Entity::find_by_id(transaction_id.into_inner())
            .filter(transactions::Column::CompanyId.eq(company_id.into_inner()))
            .one(&txn)
            .await?
            .ok_or(LedgerStoreError::TransactionNotFound(transaction_id))?;

        let current = mapping::transaction(&header);
        let allowed = match to {
            TransactionStatus::Posted => current.can_post(),
            TransactionStatus::Voided => current.can_void(),
            TransactionStatus::Draft => false,
        };
        if !allowed {
            return Err(LedgerStoreError::InvalidTransition {
                id: transaction_id,
                from: current.status,
                to,
            }
            .into());
        }

        set_status(&txn, transaction_id, to).await?;
        txn.commit().await?;
        debug!(%transaction_id, from = %current.status, %to, "Transaction status changed");
        Ok(())
    }
}

async fn set_status<C: sea_orm::ConnectionTrait>(
    db: &C,
    transaction_id: TransactionId,
    status: TransactionStatus,
) -> Result<(), RepositoryError> {
    transactions::Entity::update_many()
        .set(transactions::ActiveModel {
            status: Set(status.into()),
            ..Default::default()
        })
        .filter(transactions::Column::Id.eq(transaction_id.into_inner()))
        .exec(db)
        .await?;
    Ok(())
}


#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;

//! Tests for the ledger repository against a mock database.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use tally_core::StatementEngine;
use tally_core::ledger::{LedgerSource, NewTransaction};
use tally_shared::types::{AccountId, CompanyId, TransactionId};
use uuid::Uuid;

use super::*;
use crate::entities::sea_orm_active_enums::AccountType;
use crate::repositories::mapping::fixtures;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_load_snapshot_feeds_statements() {
    let company_uuid = Uuid::now_v7();
    let mut cash = fixtures::account(company_uuid, "1000", AccountType::Asset);
    cash.sub_type = Some("cash".to_string());
    cash.current_balance = dec!(100);
    let mut sales = fixtures::account(company_uuid, "4000", AccountType::Revenue);
    sales.current_balance = dec!(-100);

    let sale = fixtures::transaction(company_uuid, date(2024, 3, 1), "Cash sale");
    let lines = vec![
        fixtures::line(&sale, cash.id, dec!(100)),
        fixtures::line(&sale, sales.id, dec!(-100)),
    ];

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![fixtures::company(company_uuid)]])
        .append_query_results([vec![cash.clone(), sales.clone()]])
        .append_query_results([vec![sale.clone()]])
        .append_query_results([lines])
        .into_connection();
    let repo = LedgerRepository::new(db);

    let company_id = CompanyId::from_uuid(company_uuid);
    let snapshot = repo.load_snapshot(company_id, None).await.unwrap();

    assert_eq!(snapshot.company(company_id).unwrap().name, "Acme Trading");
    let cash_account = snapshot
        .account(company_id, AccountId::from_uuid(cash.id))
        .unwrap();
    assert_eq!(cash_account.current_balance, dec!(100));

    let transaction = snapshot
        .transaction(company_id, TransactionId::from_uuid(sale.id))
        .unwrap();
    assert_eq!(transaction.description, "Cash sale");

    let report = StatementEngine::default()
        .profit_and_loss(&snapshot, company_id, date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    assert_eq!(report.net_income, dec!(100));
}

#[tokio::test]
async fn test_load_snapshot_unknown_company() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<companies::Model>::new()])
        .into_connection();
    let repo = LedgerRepository::new(db);

    let err = repo
        .load_snapshot(CompanyId::new(), Some(date(2024, 12, 31)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Store(LedgerStoreError::CompanyNotFound(_))
    ));
    assert_eq!(err.http_status_code(), 404);
}

#[tokio::test]
async fn test_record_transaction_rejects_empty() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = LedgerRepository::new(db);

    let input = NewTransaction::new(CompanyId::new(), date(2024, 3, 1), "Nothing");
    let err = repo.record_transaction(input).await.unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Store(LedgerStoreError::EmptyTransaction)
    ));
}

#[tokio::test]
async fn test_void_rejects_already_voided() {
    let company_uuid = Uuid::now_v7();
    let mut voided = fixtures::transaction(company_uuid, date(2024, 3, 1), "Sale");
    voided.status = crate::entities::sea_orm_active_enums::TransactionStatus::Voided;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![voided.clone()]])
        .into_connection();
    let repo = LedgerRepository::new(db);

    let err = repo
        .void_transaction(
            CompanyId::from_uuid(company_uuid),
            TransactionId::from_uuid(voided.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Store(LedgerStoreError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_post_draft_updates_status() {
    let company_uuid = Uuid::now_v7();
    let mut draft = fixtures::transaction(company_uuid, date(2024, 3, 1), "Sale");
    draft.status = crate::entities::sea_orm_active_enums::TransactionStatus::Draft;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![draft.clone()]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let repo = LedgerRepository::new(db);

    repo.post_transaction(
        CompanyId::from_uuid(company_uuid),
        TransactionId::from_uuid(draft.id),
    )
    .await
    .unwrap();
}

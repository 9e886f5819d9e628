//! `SeaORM` active enums mirroring the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::account::AccountType as CoreAccountType;
use tally_core::ledger::TransactionStatus as CoreTransactionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
    #[sea_orm(string_value = "voided")]
    Voided,
}

impl From<AccountType> for CoreAccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<CoreAccountType> for AccountType {
    fn from(value: CoreAccountType) -> Self {
        match value {
            CoreAccountType::Asset => Self::Asset,
            CoreAccountType::Liability => Self::Liability,
            CoreAccountType::Equity => Self::Equity,
            CoreAccountType::Revenue => Self::Revenue,
            CoreAccountType::Expense => Self::Expense,
        }
    }
}

impl From<TransactionStatus> for CoreTransactionStatus {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Draft => Self::Draft,
            TransactionStatus::Posted => Self::Posted,
            TransactionStatus::Voided => Self::Voided,
        }
    }
}

impl From<CoreTransactionStatus> for TransactionStatus {
    fn from(value: CoreTransactionStatus) -> Self {
        match value {
            CoreTransactionStatus::Draft => Self::Draft,
            CoreTransactionStatus::Posted => Self::Posted,
            CoreTransactionStatus::Voided => Self::Voided,
        }
    }
}

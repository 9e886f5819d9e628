//! Conversions between entity models and core domain types.

use chrono::NaiveDate;
use sea_orm::ActiveValue::Set;
use tally_core::account::Account;
use tally_core::ledger::{Company, LedgerLine, LedgerStoreError, Transaction};
use tally_shared::types::{
    AccountId, CompanyId, CurrencyCode, LedgerLineId, TransactionId,
};

use crate::entities::{accounts, companies, transaction_lines, transactions};

fn currency(code: &str) -> Result<CurrencyCode, LedgerStoreError> {
    code.parse().map_err(LedgerStoreError::Backend)
}

pub(crate) fn company(model: companies::Model) -> Result<Company, LedgerStoreError> {
    Ok(Company {
        id: CompanyId::from_uuid(model.id),
        currency: currency(&model.currency)?,
        name: model.name,
    })
}

pub(crate) fn account(model: accounts::Model) -> Result<Account, LedgerStoreError> {
    Ok(Account {
        id: AccountId::from_uuid(model.id),
        company_id: CompanyId::from_uuid(model.company_id),
        currency: currency(&model.currency)?,
        code: model.code,
        name: model.name,
        account_type: model.account_type.into(),
        sub_type: model.sub_type,
        parent_id: model.parent_account_id.map(AccountId::from_uuid),
        is_bank_account: model.is_bank_account,
        is_control_account: model.is_control_account,
        is_system: model.is_system,
        is_active: model.is_active,
        current_balance: model.current_balance,
        tax_category: model.tax_category,
    })
}

pub(crate) fn transaction(model: &transactions::Model) -> Transaction {
    Transaction {
        id: TransactionId::from_uuid(model.id),
        company_id: CompanyId::from_uuid(model.company_id),
        date: model.transaction_date,
        description: model.description.clone(),
        reference: model.reference.clone(),
        status: model.status.into(),
    }
}

pub(crate) fn line(model: transaction_lines::Model, date: NaiveDate) -> LedgerLine {
    LedgerLine {
        id: LedgerLineId::from_uuid(model.id),
        transaction_id: TransactionId::from_uuid(model.transaction_id),
        account_id: AccountId::from_uuid(model.account_id),
        amount: model.amount,
        date,
        description: model.description,
    }
}

/// Copies every writable account field onto an active model.
pub(crate) fn write_account(active: &mut accounts::ActiveModel, account: &Account) {
    active.code = Set(account.code.clone());
    active.name = Set(account.name.clone());
    active.account_type = Set(account.account_type.into());
    active.sub_type = Set(account.sub_type.clone());
    active.parent_account_id = Set(account.parent_id.map(AccountId::into_inner));
    active.is_bank_account = Set(account.is_bank_account);
    active.is_control_account = Set(account.is_control_account);
    active.is_active = Set(account.is_active);
    active.tax_category = Set(account.tax_category.clone());
}

pub(crate) fn new_account(account: &Account) -> accounts::ActiveModel {
    let now = chrono::Utc::now().into();
    let mut active = accounts::ActiveModel {
        id: Set(account.id.into_inner()),
        company_id: Set(account.company_id.into_inner()),
        is_system: Set(account.is_system),
        current_balance: Set(account.current_balance),
        currency: Set(account.currency.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    write_account(&mut active, account);
    active
}

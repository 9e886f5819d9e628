//! Business rules for the account write path.
//!
//! Every function here is pure: callers pass the company's current accounts
//! and persist the returned value themselves.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use tally_shared::types::{AccountId, CurrencyCode};

use super::error::AccountError;
use super::types::{Account, AccountPatch, DeletionOutcome, NewAccount};

/// Builds a new active account after validating it against the company's chart.
///
/// # Errors
///
/// - `EmptyField` if code or name is blank
/// - `DuplicateCode` if the code exists in the same company
/// - `ParentNotFound` / `ParentTypeMismatch` for an invalid parent
pub fn create_account(
    input: NewAccount,
    currency: CurrencyCode,
    existing: &[Account],
) -> Result<Account, AccountError> {
    let code = required(&input.code, "code")?;
    let name = required(&input.name, "name")?;

    let siblings = || existing.iter().filter(|a| a.company_id == input.company_id);

    if siblings().any(|a| a.code == code) {
        return Err(AccountError::DuplicateCode(code));
    }

    if let Some(parent_id) = input.parent_id {
        let parent = siblings()
            .find(|a| a.id == parent_id)
            .ok_or(AccountError::ParentNotFound(parent_id))?;
        if parent.account_type != input.account_type {
            return Err(AccountError::ParentTypeMismatch {
                expected: input.account_type,
                found: parent.account_type,
            });
        }
    }

    Ok(Account {
        id: AccountId::new(),
        company_id: input.company_id,
        code,
        name,
        account_type: input.account_type,
        sub_type: input.sub_type,
        parent_id: input.parent_id,
        is_bank_account: input.is_bank_account,
        is_control_account: input.is_control_account,
        is_system: input.is_system,
        is_active: true,
        current_balance: Decimal::ZERO,
        currency,
        tax_category: input.tax_category,
    })
}

/// Applies a patch to an account, returning the updated copy.
///
/// `has_postings` tells whether any ledger line references the account.
///
/// # Errors
///
/// - `SystemAccountImmutable` for system accounts, whatever the patch
/// - `EmptyField`, `DuplicateCode` for bad code or name
/// - `TypeChangeNotAllowed` when changing type on an account with postings
/// - `ChildTypeMismatch` when changing type on an account with children
/// - `SelfParent`, `ParentNotFound`, `ParentTypeMismatch`, `HierarchyCycle`
pub fn apply_patch(
    account: &Account,
    patch: &AccountPatch,
    existing: &[Account],
    has_postings: bool,
) -> Result<Account, AccountError> {
    if account.is_system {
        return Err(AccountError::SystemAccountImmutable(account.id));
    }

    let mut updated = account.clone();

    if let Some(code) = patch.code.as_deref() {
        let code = required(code, "code")?;
        if code != account.code
            && existing
                .iter()
                .any(|a| a.company_id == account.company_id && a.id != account.id && a.code == code)
        {
            return Err(AccountError::DuplicateCode(code));
        }
        updated.code = code;
    }

    if let Some(name) = patch.name.as_deref() {
        updated.name = required(name, "name")?;
    }

    if let Some(account_type) = patch.account_type {
        if account_type != account.account_type {
            if has_postings {
                return Err(AccountError::TypeChangeNotAllowed(account.id));
            }
            if let Some(child) = existing
                .iter()
                .find(|a| a.parent_id == Some(account.id) && a.account_type != account_type)
            {
                return Err(AccountError::ChildTypeMismatch {
                    account: account.id,
                    child: child.id,
                    child_type: child.account_type,
                });
            }
        }
        updated.account_type = account_type;
    }

    if let Some(parent_id) = patch.parent_id {
        updated.parent_id = parent_id;
    }

    // Revalidate the parent whenever either side of the relation may have moved.
    if patch.parent_id.is_some() || updated.account_type != account.account_type {
        if let Some(parent_id) = updated.parent_id {
            validate_parent(&updated, parent_id, existing)?;
        }
    }

    if let Some(sub_type) = &patch.sub_type {
        updated.sub_type.clone_from(sub_type);
    }
    if let Some(is_bank_account) = patch.is_bank_account {
        updated.is_bank_account = is_bank_account;
    }
    if let Some(is_control_account) = patch.is_control_account {
        updated.is_control_account = is_control_account;
    }
    if let Some(tax_category) = &patch.tax_category {
        updated.tax_category.clone_from(tax_category);
    }
    if let Some(is_active) = patch.is_active {
        updated.is_active = is_active;
    }

    Ok(updated)
}

/// Decides how a deletion request is carried out.
///
/// Accounts referenced by any ledger line are deactivated instead of removed,
/// so historical reports keep resolving them.
///
/// # Errors
///
/// Returns `SystemAccountUndeletable` for system accounts.
pub fn plan_deletion(account: &Account, line_count: u64) -> Result<DeletionOutcome, AccountError> {
    if account.is_system {
        return Err(AccountError::SystemAccountUndeletable(account.id));
    }
    if line_count == 0 {
        Ok(DeletionOutcome::Deleted)
    } else {
        Ok(DeletionOutcome::Deactivated)
    }
}

/// Returns the ancestor chain of `id`, nearest first.
///
/// Stops at a missing parent or at the first repeated id, so a corrupted
/// chart cannot loop forever.
#[must_use]
pub fn ancestors(accounts: &[Account], id: AccountId) -> Vec<AccountId> {
    let parents: HashMap<AccountId, Option<AccountId>> =
        accounts.iter().map(|a| (a.id, a.parent_id)).collect();

    let mut chain = Vec::new();
    let mut seen = HashSet::from([id]);
    let mut cursor = parents.get(&id).copied().flatten();

    while let Some(current) = cursor {
        if !seen.insert(current) {
            break;
        }
        chain.push(current);
        cursor = parents.get(&current).copied().flatten();
    }

    chain
}

/// Returns true if making `parent_id` the parent of `account_id` closes a cycle.
#[must_use]
pub fn creates_cycle(accounts: &[Account], account_id: AccountId, parent_id: AccountId) -> bool {
    parent_id == account_id || ancestors(accounts, parent_id).contains(&account_id)
}

fn validate_parent(
    account: &Account,
    parent_id: AccountId,
    existing: &[Account],
) -> Result<(), AccountError> {
    if parent_id == account.id {
        return Err(AccountError::SelfParent);
    }

    let parent = existing
        .iter()
        .find(|a| a.id == parent_id && a.company_id == account.company_id)
        .ok_or(AccountError::ParentNotFound(parent_id))?;

    if parent.account_type != account.account_type {
        return Err(AccountError::ParentTypeMismatch {
            expected: account.account_type,
            found: parent.account_type,
        });
    }

    if creates_cycle(existing, account.id, parent_id) {
        return Err(AccountError::HierarchyCycle {
            account: account.id,
            parent: parent_id,
        });
    }

    Ok(())
}

fn required(value: &str, field: &'static str) -> Result<String, AccountError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccountError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::types::AccountType;
    use tally_shared::types::CompanyId;

    fn chart() -> (CompanyId, Vec<Account>) {
        let company = CompanyId::new();
        let mut accounts = Vec::new();
        let assets = create_account(
            NewAccount::new(company, "1000", "Current Assets", AccountType::Asset),
            CurrencyCode::USD,
            &accounts,
        )
        .unwrap();
        accounts.push(assets.clone());
        let cash = create_account(
            NewAccount::new(company, "1010", "Cash", AccountType::Asset).with_parent(assets.id),
            CurrencyCode::USD,
            &accounts,
        )
        .unwrap();
        accounts.push(cash.clone());
        let petty = create_account(
            NewAccount::new(company, "1011", "Petty Cash", AccountType::Asset).with_parent(cash.id),
            CurrencyCode::USD,
            &accounts,
        )
        .unwrap();
        accounts.push(petty);
        let sales = create_account(
            NewAccount::new(company, "4000", "Sales", AccountType::Revenue),
            CurrencyCode::USD,
            &accounts,
        )
        .unwrap();
        accounts.push(sales);
        (company, accounts)
    }

    fn find<'a>(accounts: &'a [Account], code: &str) -> &'a Account {
        accounts.iter().find(|a| a.code == code).unwrap()
    }

    #[test]
    fn test_create_account_defaults() {
        let (company, accounts) = chart();
        let account = create_account(
            NewAccount::new(company, " 6100 ", " Rent ", AccountType::Expense),
            CurrencyCode::USD,
            &accounts,
        )
        .unwrap();

        assert_eq!(account.code, "6100");
        assert_eq!(account.name, "Rent");
        assert!(account.is_active);
        assert!(!account.is_system);
        assert_eq!(account.current_balance, Decimal::ZERO);
    }

    #[test]
    fn test_create_rejects_blank_fields() {
        let (company, accounts) = chart();
        let err = create_account(
            NewAccount::new(company, "  ", "Rent", AccountType::Expense),
            CurrencyCode::USD,
            &accounts,
        )
        .unwrap_err();
        assert!(matches!(err, AccountError::EmptyField("code")));
    }

    #[test]
    fn test_create_rejects_duplicate_code() {
        let (company, accounts) = chart();
        let err = create_account(
            NewAccount::new(company, "1000", "Duplicate", AccountType::Asset),
            CurrencyCode::USD,
            &accounts,
        )
        .unwrap_err();
        assert!(matches!(err, AccountError::DuplicateCode(code) if code == "1000"));
    }

    #[test]
    fn test_same_code_allowed_in_other_company() {
        let (_, accounts) = chart();
        let other = CompanyId::new();
        assert!(
            create_account(
                NewAccount::new(other, "1000", "Cash", AccountType::Asset),
                CurrencyCode::USD,
                &accounts,
            )
            .is_ok()
        );
    }

    #[test]
    fn test_create_rejects_parent_of_other_type() {
        let (company, accounts) = chart();
        let sales = find(&accounts, "4000");
        let err = create_account(
            NewAccount::new(company, "6000", "Rent", AccountType::Expense).with_parent(sales.id),
            CurrencyCode::USD,
            &accounts,
        )
        .unwrap_err();
        assert!(matches!(err, AccountError::ParentTypeMismatch { .. }));
    }

    #[test]
    fn test_create_rejects_missing_parent() {
        let (company, accounts) = chart();
        let err = create_account(
            NewAccount::new(company, "1020", "Bank", AccountType::Asset)
                .with_parent(AccountId::new()),
            CurrencyCode::USD,
            &accounts,
        )
        .unwrap_err();
        assert!(matches!(err, AccountError::ParentNotFound(_)));
    }

    #[test]
    fn test_patch_rejects_system_account() {
        let (_, mut accounts) = chart();
        accounts[0].is_system = true;
        let patch = AccountPatch {
            name: Some("Renamed".to_string()),
            ..AccountPatch::default()
        };
        let err = apply_patch(&accounts[0], &patch, &accounts, false).unwrap_err();
        assert!(matches!(err, AccountError::SystemAccountImmutable(_)));

        // Even an empty patch is refused.
        let err = apply_patch(&accounts[0], &AccountPatch::default(), &accounts, false).unwrap_err();
        assert!(matches!(err, AccountError::SystemAccountImmutable(_)));
    }

    #[test]
    fn test_patch_rejects_self_parent() {
        let (_, accounts) = chart();
        let cash = find(&accounts, "1010");
        let patch = AccountPatch {
            parent_id: Some(Some(cash.id)),
            ..AccountPatch::default()
        };
        let err = apply_patch(cash, &patch, &accounts, false).unwrap_err();
        assert!(matches!(err, AccountError::SelfParent));
    }

    #[test]
    fn test_patch_rejects_cycle() {
        let (_, accounts) = chart();
        let assets = find(&accounts, "1000");
        let petty = find(&accounts, "1011");
        let patch = AccountPatch {
            parent_id: Some(Some(petty.id)),
            ..AccountPatch::default()
        };
        let err = apply_patch(assets, &patch, &accounts, false).unwrap_err();
        assert!(matches!(err, AccountError::HierarchyCycle { .. }));
    }

    #[test]
    fn test_patch_type_change_blocked_by_postings() {
        let (_, accounts) = chart();
        let sales = find(&accounts, "4000");
        let patch = AccountPatch {
            account_type: Some(AccountType::Expense),
            ..AccountPatch::default()
        };
        assert!(matches!(
            apply_patch(sales, &patch, &accounts, true).unwrap_err(),
            AccountError::TypeChangeNotAllowed(_)
        ));
        let updated = apply_patch(sales, &patch, &accounts, false).unwrap();
        assert_eq!(updated.account_type, AccountType::Expense);
    }

    #[test]
    fn test_patch_type_change_revalidates_parent() {
        let (_, accounts) = chart();
        let petty = find(&accounts, "1011");
        let patch = AccountPatch {
            account_type: Some(AccountType::Expense),
            ..AccountPatch::default()
        };
        assert!(matches!(
            apply_patch(petty, &patch, &accounts, false).unwrap_err(),
            AccountError::ParentTypeMismatch { .. }
        ));
    }

    #[test]
    fn test_patch_type_change_rejected_with_children() {
        let (_, accounts) = chart();
        let assets = find(&accounts, "1000");
        let cash = find(&accounts, "1010");
        let patch = AccountPatch {
            account_type: Some(AccountType::Expense),
            ..AccountPatch::default()
        };
        let err = apply_patch(assets, &patch, &accounts, false).unwrap_err();
        assert!(matches!(
            err,
            AccountError::ChildTypeMismatch { account, child, child_type: AccountType::Asset }
                if account == assets.id && child == cash.id
        ));
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);

        // Same type is a no-op for the hierarchy.
        let patch = AccountPatch {
            account_type: Some(AccountType::Asset),
            ..AccountPatch::default()
        };
        assert!(apply_patch(assets, &patch, &accounts, false).is_ok());
    }

    #[test]
    fn test_patch_code_conflict_and_rename() {
        let (_, accounts) = chart();
        let cash = find(&accounts, "1010");
        let conflict = AccountPatch {
            code: Some("1000".to_string()),
            ..AccountPatch::default()
        };
        assert!(matches!(
            apply_patch(cash, &conflict, &accounts, false).unwrap_err(),
            AccountError::DuplicateCode(_)
        ));

        let same_code = AccountPatch {
            code: Some("1010".to_string()),
            name: Some("Cash on Hand".to_string()),
            is_active: Some(false),
            ..AccountPatch::default()
        };
        let updated = apply_patch(cash, &same_code, &accounts, true).unwrap();
        assert_eq!(updated.name, "Cash on Hand");
        assert!(!updated.is_active);
    }

    #[test]
    fn test_plan_deletion() {
        let (_, mut accounts) = chart();
        assert_eq!(plan_deletion(&accounts[3], 0).unwrap(), DeletionOutcome::Deleted);
        assert_eq!(
            plan_deletion(&accounts[3], 4).unwrap(),
            DeletionOutcome::Deactivated
        );
        accounts[3].is_system = true;
        assert!(matches!(
            plan_deletion(&accounts[3], 0).unwrap_err(),
            AccountError::SystemAccountUndeletable(_)
        ));
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let (_, accounts) = chart();
        let petty = find(&accounts, "1011");
        let cash = find(&accounts, "1010");
        let assets = find(&accounts, "1000");
        assert_eq!(ancestors(&accounts, petty.id), vec![cash.id, assets.id]);
        assert!(ancestors(&accounts, assets.id).is_empty());
    }

    #[test]
    fn test_ancestors_terminates_on_corrupt_cycle() {
        let (_, mut accounts) = chart();
        let petty_id = find(&accounts, "1011").id;
        accounts[0].parent_id = Some(petty_id);
        let chain = ancestors(&accounts, petty_id);
        assert_eq!(chain.len(), 2);
    }
}

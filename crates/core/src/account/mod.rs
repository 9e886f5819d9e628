//! Chart of accounts.
//!
//! - Account types and their normal balance side
//! - Account value type and write inputs
//! - Validation rules for create, update, and delete
//! - Filtering and paging for listings

pub mod error;
pub mod types;
pub mod validation;

use tally_shared::types::{PageRequest, PageResponse};

pub use error::AccountError;
pub use types::{
    Account, AccountFilter, AccountPatch, AccountType, DeletionOutcome, NewAccount, NormalSide,
    subtype,
};
pub use validation::{ancestors, apply_patch, create_account, creates_cycle, plan_deletion};

/// Filters and pages a company's accounts, ordered by code.
#[must_use]
pub fn list_accounts(
    accounts: &[Account],
    filter: &AccountFilter,
    page: PageRequest,
) -> PageResponse<Account> {
    let mut matching: Vec<&Account> = accounts.iter().filter(|a| filter.matches(a)).collect();
    matching.sort_by(|a, b| a.code.cmp(&b.code));

    let total = matching.len() as u64;
    let data = matching
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
        .cloned()
        .collect();

    PageResponse::new(data, page, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_shared::types::{CompanyId, CurrencyCode};

    #[test]
    fn test_list_accounts_orders_and_pages() {
        let company = CompanyId::new();
        let mut accounts = Vec::new();
        for (code, name) in [("4000", "Sales"), ("1000", "Cash"), ("6000", "Rent")] {
            let account_type = match code {
                "1000" => AccountType::Asset,
                "4000" => AccountType::Revenue,
                _ => AccountType::Expense,
            };
            let account = create_account(
                NewAccount::new(company, code, name, account_type),
                CurrencyCode::USD,
                &accounts,
            )
            .unwrap();
            accounts.push(account);
        }

        let page = list_accounts(&accounts, &AccountFilter::all(), PageRequest::new(2, 0));
        let codes: Vec<_> = page.data.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["1000", "4000"]);
        assert_eq!(page.total, 3);
        assert!(page.has_more);

        let rest = list_accounts(&accounts, &AccountFilter::all(), PageRequest::new(2, 2));
        assert_eq!(rest.data.len(), 1);
        assert!(!rest.has_more);
    }
}

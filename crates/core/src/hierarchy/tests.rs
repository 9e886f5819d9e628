//! Tests for the chart tree.

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::{AccountId, CompanyId, CurrencyCode};

use super::*;
use crate::account::{Account, AccountType};

fn account(code: &str, account_type: AccountType, parent: Option<AccountId>) -> Account {
    Account {
        id: AccountId::new(),
        company_id: CompanyId::new(),
        code: code.to_string(),
        name: format!("Account {code}"),
        account_type,
        sub_type: None,
        parent_id: parent,
        is_bank_account: false,
        is_control_account: false,
        is_system: false,
        is_active: true,
        current_balance: Decimal::ZERO,
        currency: CurrencyCode::USD,
        tax_category: None,
    }
}

fn codes(nodes: &[AccountNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.account.code.as_str()).collect()
}

#[test]
fn test_groups_by_type_and_orders_by_code() {
    let assets = account("1000", AccountType::Asset, None);
    let bank = account("1020", AccountType::Asset, Some(assets.id));
    let cash = account("1010", AccountType::Asset, Some(assets.id));
    let sales = account("4000", AccountType::Revenue, None);
    let services = account("4100", AccountType::Revenue, None);

    let tree = build_tree(&[services, bank, sales, cash, assets]);

    let asset_forest = tree.nested(AccountType::Asset);
    assert_eq!(codes(&asset_forest), vec!["1000"]);
    assert_eq!(codes(&asset_forest[0].children), vec!["1010", "1020"]);
    assert_eq!(asset_forest[0].children[0].depth, 1);

    assert_eq!(codes(&tree.nested(AccountType::Revenue)), vec!["4000", "4100"]);
    assert!(tree.nested(AccountType::Expense).is_empty());
    assert_eq!(tree.len(), 5);
}

#[test]
fn test_inactive_accounts_are_excluded() {
    let parent = account("6000", AccountType::Expense, None);
    let mut retired = account("6100", AccountType::Expense, Some(parent.id));
    retired.is_active = false;
    let grandchild = account("6110", AccountType::Expense, Some(retired.id));

    let tree = build_tree(&[parent.clone(), retired.clone(), grandchild.clone()]);

    assert_eq!(tree.len(), 2);
    assert!(tree.get(retired.id).is_none());
    // Orphaned by the inactive parent, promoted to a root.
    assert_eq!(tree.parent_of(grandchild.id), None);
    assert_eq!(
        codes(&tree.nested(AccountType::Expense)),
        vec!["6000", "6110"]
    );
}

#[test]
fn test_parent_of_other_type_is_ignored() {
    let equity = account("3000", AccountType::Equity, None);
    let odd = account("1000", AccountType::Asset, Some(equity.id));
    let tree = build_tree(&[equity, odd.clone()]);
    assert_eq!(tree.parent_of(odd.id), None);
    assert_eq!(tree.roots(AccountType::Asset).len(), 1);
}

#[test]
fn test_corrupt_cycle_is_broken() {
    let mut a = account("1000", AccountType::Asset, None);
    let b = account("1100", AccountType::Asset, Some(a.id));
    a.parent_id = Some(b.id);
    let tail = account("1110", AccountType::Asset, Some(b.id));

    let tree = build_tree(&[a.clone(), b.clone(), tail.clone()]);
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.roots(AccountType::Asset).len(), 1);
    assert_eq!(tree.preorder(AccountType::Asset).len(), 3);
}

#[test]
fn test_preorder_visits_parents_first() {
    let root = account("5000", AccountType::Expense, None);
    let child = account("5100", AccountType::Expense, Some(root.id));
    let leaf = account("5110", AccountType::Expense, Some(child.id));
    let sibling = account("5200", AccountType::Expense, Some(root.id));

    let tree = build_tree(&[leaf, sibling, child, root]);
    let order: Vec<_> = tree
        .preorder(AccountType::Expense)
        .iter()
        .map(|n| n.account.code.as_str())
        .collect();
    assert_eq!(order, vec!["5000", "5100", "5110", "5200"]);
}

#[test]
fn test_rollup_sums_subtrees() {
    let root = account("1000", AccountType::Asset, None);
    let cash = account("1010", AccountType::Asset, Some(root.id));
    let petty = account("1011", AccountType::Asset, Some(cash.id));
    let bank = account("1020", AccountType::Asset, Some(root.id));

    let tree = build_tree(&[root.clone(), cash.clone(), petty.clone(), bank.clone()]);
    let balances = HashMap::from([
        (cash.id, dec!(100)),
        (petty.id, dec!(25.50)),
        (bank.id, dec!(900)),
    ]);
    let totals = tree.rollup(&balances);

    assert_eq!(totals[&petty.id], dec!(25.50));
    assert_eq!(totals[&cash.id], dec!(125.50));
    assert_eq!(totals[&bank.id], dec!(900));
    assert_eq!(totals[&root.id], dec!(1025.50));
}

#[test]
fn test_forest_serializes() {
    let tree = build_tree(&[account("1000", AccountType::Asset, None)]);
    let json = serde_json::to_value(tree.forest()).unwrap();
    assert_eq!(json["asset"][0]["account"]["code"], "1000");
    assert_eq!(json["liability"], serde_json::json!([]));
}

/// Random acyclic charts: each account may pick an earlier account as parent.
fn chart() -> impl Strategy<Value = Vec<Account>> {
    prop::collection::vec(
        (
            0usize..5,
            prop::option::of(any::<prop::sample::Index>()),
            any::<bool>(),
        ),
        0..60,
    )
    .prop_map(|specs| {
        let mut accounts: Vec<Account> = Vec::with_capacity(specs.len());
        for (i, (type_idx, parent_pick, active)) in specs.into_iter().enumerate() {
            let account_type = AccountType::ALL[type_idx];
            let parent = parent_pick.and_then(|pick| {
                let same_type: Vec<AccountId> = accounts
                    .iter()
                    .filter(|a| a.account_type == account_type)
                    .map(|a| a.id)
                    .collect();
                (!same_type.is_empty()).then(|| same_type[pick.index(same_type.len())])
            });
            let mut acct = account(&format!("{i:04}"), account_type, parent);
            acct.is_active = active;
            accounts.push(acct);
        }
        accounts
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Node count equals the active-account count.
    #[test]
    fn prop_node_count_matches_active_accounts(accounts in chart()) {
        let tree = build_tree(&accounts);
        let active = accounts.iter().filter(|a| a.is_active).count();
        prop_assert_eq!(tree.len(), active);

        let reachable: usize = AccountType::ALL
            .iter()
            .map(|&t| tree.preorder(t).len())
            .sum();
        prop_assert_eq!(reachable, active);
    }

    /// A node's tree parent is its declared parent whenever that parent is in the tree.
    #[test]
    fn prop_parent_matches_declared_parent(accounts in chart()) {
        let tree = build_tree(&accounts);
        for account in accounts.iter().filter(|a| a.is_active) {
            let expected = account.parent_id.filter(|pid| tree.get(*pid).is_some());
            prop_assert_eq!(tree.parent_of(account.id), expected);
        }
    }

    /// The rolled-up root totals add up to the sum of all balances.
    #[test]
    fn prop_rollup_preserves_total(accounts in chart()) {
        let tree = build_tree(&accounts);
        let balances: HashMap<AccountId, Decimal> = accounts
            .iter()
            .filter(|a| a.is_active)
            .enumerate()
            .map(|(i, a)| (a.id, Decimal::from(i as i64 + 1)))
            .collect();
        let totals = tree.rollup(&balances);

        let root_sum: Decimal = AccountType::ALL
            .iter()
            .flat_map(|&t| tree.roots(t).iter())
            .map(|&i| totals[&tree.node(i).unwrap().account.id])
            .sum();
        let all: Decimal = balances.values().copied().sum();
        prop_assert_eq!(root_sum, all);
    }
}

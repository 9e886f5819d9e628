//! Cash movement classification.

use std::collections::{HashMap, HashSet};

use tally_shared::types::{AccountId, TransactionId};

use super::error::ReportError;
use super::types::CashFlowCategory;
use crate::account::Account;
use crate::ledger::LedgerLine;

/// Non-cash lines of each transaction, in store order.
pub(crate) fn counter_lines<'a>(
    lines: &'a [LedgerLine],
    cash_ids: &HashSet<AccountId>,
) -> HashMap<TransactionId, Vec<&'a LedgerLine>> {
    let mut grouped: HashMap<TransactionId, Vec<&LedgerLine>> = HashMap::new();
    for line in lines.iter().filter(|l| !cash_ids.contains(&l.account_id)) {
        grouped.entry(line.transaction_id).or_default().push(line);
    }
    grouped
}

/// Classifies a cash movement by its transaction's counter-lines.
///
/// Starts as operating; each counter-line whose account implies a category
/// overwrites it, so the last one inspected wins.
///
/// # Errors
///
/// Returns `Inconsistent` if a counter-line's account is not in `chart`.
pub(crate) fn classify(
    counters: &[&LedgerLine],
    chart: &HashMap<AccountId, Account>,
) -> Result<CashFlowCategory, ReportError> {
    let mut category = CashFlowCategory::Operating;
    for line in counters {
        let account = chart
            .get(&line.account_id)
            .ok_or(ReportError::Inconsistent {
                line: line.id,
                account: line.account_id,
            })?;
        if let Some(implied) = CashFlowCategory::implied_by(account) {
            category = implied;
        }
    }
    Ok(category)
}

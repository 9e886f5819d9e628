//! Summation of ledger lines per account.
//!
//! Accumulation is associative and commutative, so lines may arrive in one
//! batch, in chunks, or across threads with the same result.

use std::collections::BTreeMap;

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::AccountId;

use crate::ledger::LedgerLine;

/// Line activity for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccountActivity {
    /// Sum of positive amounts.
    pub debits: Decimal,
    /// Sum of the absolute values of negative amounts.
    pub credits: Decimal,
    /// Signed sum of all amounts (`debits - credits`).
    pub net: Decimal,
    /// Number of lines seen.
    pub line_count: u64,
}

impl AccountActivity {
    /// Adds one signed amount.
    pub fn record(&mut self, amount: Decimal) {
        if amount.is_sign_negative() {
            self.credits -= amount;
        } else {
            self.debits += amount;
        }
        self.net += amount;
        self.line_count += 1;
    }

    /// Adds another activity into this one.
    pub fn absorb(&mut self, other: &Self) {
        self.debits += other.debits;
        self.credits += other.credits;
        self.net += other.net;
        self.line_count += other.line_count;
    }
}

/// Per-account sums plus the grand total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Balances {
    /// Activity keyed by account.
    pub per_account: BTreeMap<AccountId, AccountActivity>,
    /// Signed sum over every account.
    pub total: Decimal,
}

impl Balances {
    /// Net amount for an account, zero when it had no lines.
    #[must_use]
    pub fn net(&self, account_id: AccountId) -> Decimal {
        self.per_account
            .get(&account_id)
            .map_or(Decimal::ZERO, |a| a.net)
    }

    /// Activity for an account, zero when it had no lines.
    #[must_use]
    pub fn activity(&self, account_id: AccountId) -> AccountActivity {
        self.per_account.get(&account_id).copied().unwrap_or_default()
    }
}

/// Running per-account sums.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceAccumulator {
    per_account: BTreeMap<AccountId, AccountActivity>,
}

impl BalanceAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one line.
    pub fn push(&mut self, line: &LedgerLine) {
        self.push_amount(line.account_id, line.amount);
    }

    /// Adds one signed amount for an account.
    pub fn push_amount(&mut self, account_id: AccountId, amount: Decimal) {
        self.per_account.entry(account_id).or_default().record(amount);
    }

    /// Adds a batch of lines.
    pub fn extend<'a>(&mut self, lines: impl IntoIterator<Item = &'a LedgerLine>) {
        for line in lines {
            self.push(line);
        }
    }

    /// Combines two accumulators.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (account_id, activity) in other.per_account {
            self.per_account.entry(account_id).or_default().absorb(&activity);
        }
        self
    }

    /// Ensures each listed account has an entry, even with no lines.
    pub fn include(&mut self, account_ids: &[AccountId]) {
        for &account_id in account_ids {
            self.per_account.entry(account_id).or_default();
        }
    }

    /// Finalizes into per-account balances and the grand total.
    #[must_use]
    pub fn finish(self) -> Balances {
        let total = self.per_account.values().map(|a| a.net).sum();
        Balances {
            per_account: self.per_account,
            total,
        }
    }
}

/// Sums lines sequentially.
#[must_use]
pub fn accumulate<'a>(lines: impl IntoIterator<Item = &'a LedgerLine>) -> BalanceAccumulator {
    let mut acc = BalanceAccumulator::new();
    acc.extend(lines);
    acc
}

/// Sums lines on the rayon pool, `chunk_size` lines per task.
#[must_use]
pub fn accumulate_parallel(lines: &[LedgerLine], chunk_size: usize) -> BalanceAccumulator {
    lines
        .par_chunks(chunk_size.max(1))
        .fold(BalanceAccumulator::new, |mut acc, chunk| {
            acc.extend(chunk);
            acc
        })
        .reduce(BalanceAccumulator::new, BalanceAccumulator::merge)
}

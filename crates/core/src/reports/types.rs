//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{
    AccountId, CompanyId, CurrencyCode, LedgerLineId, TransactionId, round_for_presentation,
};

use crate::account::{Account, AccountType};

/// One account's amount on a statement, in display sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account subtype.
    pub sub_type: Option<String>,
    /// Amount in display sign.
    pub amount: Decimal,
}

impl StatementLine {
    pub(crate) fn new(account: &Account, amount: Decimal) -> Self {
        Self {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            sub_type: account.sub_type.clone(),
            amount,
        }
    }
}

/// A group of statement lines with its total.
///
/// Lines with a zero amount are omitted but still count (as zero) in `total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSection {
    /// Accounts ordered by code.
    pub accounts: Vec<StatementLine>,
    /// Section total.
    pub total: Decimal,
}

impl StatementSection {
    fn rounded(&self) -> Self {
        Self {
            accounts: self
                .accounts
                .iter()
                .map(|line| StatementLine {
                    amount: round_for_presentation(line.amount),
                    ..line.clone()
                })
                .collect(),
            total: round_for_presentation(self.total),
        }
    }
}

/// Profit and loss statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAndLoss {
    /// Company.
    pub company_id: CompanyId,
    /// Currency of every amount.
    pub currency: CurrencyCode,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Revenue accounts.
    pub revenue: StatementSection,
    /// Expense accounts.
    pub expenses: StatementSection,
    /// Revenue minus expenses.
    pub net_income: Decimal,
}

impl ProfitAndLoss {
    /// Total revenue.
    #[must_use]
    pub fn total_revenue(&self) -> Decimal {
        self.revenue.total
    }

    /// Total expenses.
    #[must_use]
    pub fn total_expenses(&self) -> Decimal {
        self.expenses.total
    }

    /// Copy with every amount rounded to two decimals.
    #[must_use]
    pub fn for_presentation(&self) -> Self {
        Self {
            revenue: self.revenue.rounded(),
            expenses: self.expenses.rounded(),
            net_income: round_for_presentation(self.net_income),
            ..self.clone()
        }
    }
}

/// Balance sheet at a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// Company.
    pub company_id: CompanyId,
    /// Currency of every amount.
    pub currency: CurrencyCode,
    /// Balances include every posted line up to this date.
    pub as_of: NaiveDate,
    /// Asset accounts.
    pub assets: StatementSection,
    /// Liability accounts.
    pub liabilities: StatementSection,
    /// Equity accounts.
    pub equity: StatementSection,
    /// Liabilities plus equity.
    pub total_liabilities_and_equity: Decimal,
    /// Assets minus (liabilities plus equity).
    pub difference: Decimal,
    /// Whether `|difference|` is within tolerance.
    pub balanced: bool,
}

impl BalanceSheet {
    /// Total assets.
    #[must_use]
    pub fn total_assets(&self) -> Decimal {
        self.assets.total
    }

    /// Total liabilities.
    #[must_use]
    pub fn total_liabilities(&self) -> Decimal {
        self.liabilities.total
    }

    /// Total equity.
    #[must_use]
    pub fn total_equity(&self) -> Decimal {
        self.equity.total
    }

    /// Copy with every amount rounded to two decimals.
    ///
    /// `balanced` keeps the value computed at full precision.
    #[must_use]
    pub fn for_presentation(&self) -> Self {
        Self {
            assets: self.assets.rounded(),
            liabilities: self.liabilities.rounded(),
            equity: self.equity.rounded(),
            total_liabilities_and_equity: round_for_presentation(
                self.total_liabilities_and_equity,
            ),
            difference: round_for_presentation(self.difference),
            ..self.clone()
        }
    }
}

/// Cash flow activity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowCategory {
    /// Day-to-day trading (revenue and expense counter-accounts).
    Operating,
    /// Purchase and sale of fixed assets.
    Investing,
    /// Debt and owners' capital.
    Financing,
}

impl CashFlowCategory {
    /// Category implied by a counter-account, if any.
    ///
    /// Non-fixed assets imply nothing and leave the current category as is.
    #[must_use]
    pub fn implied_by(account: &Account) -> Option<Self> {
        match account.account_type {
            AccountType::Revenue | AccountType::Expense => Some(Self::Operating),
            AccountType::Asset if account.is_fixed_asset() => Some(Self::Investing),
            AccountType::Asset => None,
            AccountType::Liability | AccountType::Equity => Some(Self::Financing),
        }
    }
}

/// One cash movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowItem {
    /// Transaction.
    pub transaction_id: TransactionId,
    /// The cash line.
    pub line_id: LedgerLineId,
    /// Transaction date.
    pub date: NaiveDate,
    /// Transaction description.
    pub description: String,
    /// Transaction reference.
    pub reference: Option<String>,
    /// Signed cash amount (positive inflow).
    pub amount: Decimal,
}

/// Cash movements of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowSection {
    /// Items ordered by date, transaction, then line.
    pub items: Vec<CashFlowItem>,
    /// Sum of item amounts.
    pub total: Decimal,
}

impl CashFlowSection {
    pub(crate) fn push(&mut self, item: CashFlowItem) {
        self.total += item.amount;
        self.items.push(item);
    }

    pub(crate) fn sort(&mut self) {
        self.items
            .sort_by(|a, b| (a.date, a.transaction_id, a.line_id).cmp(&(b.date, b.transaction_id, b.line_id)));
    }

    fn rounded(&self) -> Self {
        Self {
            items: self
                .items
                .iter()
                .map(|item| CashFlowItem {
                    amount: round_for_presentation(item.amount),
                    ..item.clone()
                })
                .collect(),
            total: round_for_presentation(self.total),
        }
    }
}

/// Cash flow statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    /// Company.
    pub company_id: CompanyId,
    /// Currency of every amount.
    pub currency: CurrencyCode,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Operating activities.
    pub operating: CashFlowSection,
    /// Investing activities.
    pub investing: CashFlowSection,
    /// Financing activities.
    pub financing: CashFlowSection,
    /// Sum of the three sections.
    pub net_cash_flow: Decimal,
    /// Cash balance before `start_date`.
    pub beginning_balance: Decimal,
    /// `beginning_balance + net_cash_flow`.
    pub ending_balance: Decimal,
}

impl CashFlowStatement {
    /// Section for a category.
    #[must_use]
    pub fn section(&self, category: CashFlowCategory) -> &CashFlowSection {
        match category {
            CashFlowCategory::Operating => &self.operating,
            CashFlowCategory::Investing => &self.investing,
            CashFlowCategory::Financing => &self.financing,
        }
    }

    /// Copy with every amount rounded to two decimals.
    #[must_use]
    pub fn for_presentation(&self) -> Self {
        Self {
            operating: self.operating.rounded(),
            investing: self.investing.rounded(),
            financing: self.financing.rounded(),
            net_cash_flow: round_for_presentation(self.net_cash_flow),
            beginning_balance: round_for_presentation(self.beginning_balance),
            ending_balance: round_for_presentation(self.ending_balance),
            ..self.clone()
        }
    }
}

/// What a trend measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendKind {
    /// Revenue in display sign.
    Revenue,
    /// Expenses in display sign.
    Expense,
    /// Net movement on cash accounts.
    CashFlow,
}

impl TrendKind {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Expense => "expense",
            Self::CashFlow => "cash_flow",
        }
    }
}

impl std::fmt::Display for TrendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One trend bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Bucket key (see `Interval`).
    pub period: String,
    /// Amount in the bucket.
    pub amount: Decimal,
}

/// Amounts bucketed by calendar interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    /// Company.
    pub company_id: CompanyId,
    /// Currency of every amount.
    pub currency: CurrencyCode,
    /// What is measured.
    pub kind: TrendKind,
    /// Bucket size.
    pub interval: super::trend::Interval,
    /// First day of the range.
    pub start_date: NaiveDate,
    /// Last day of the range.
    pub end_date: NaiveDate,
    /// Non-empty buckets in ascending order.
    pub points: Vec<TrendPoint>,
}

impl Trend {
    /// Copy with every amount rounded to two decimals.
    #[must_use]
    pub fn for_presentation(&self) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| TrendPoint {
                    period: p.period.clone(),
                    amount: round_for_presentation(p.amount),
                })
                .collect(),
            ..self.clone()
        }
    }
}

//! Chart of accounts domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CompanyId, CurrencyCode};

use super::error::AccountError;

/// Well-known values of `Account::sub_type`.
///
/// The field is free-form; only `CASH` and `FIXED_ASSET` carry meaning for
/// statement generation.
pub mod subtype {
    /// Cash on hand. Treated as a cash account by the cash flow statement.
    pub const CASH: &str = "cash";
    /// Long-lived asset. Counter-lines against it are investing activity.
    pub const FIXED_ASSET: &str = "fixed_asset";
    /// Current asset.
    pub const CURRENT_ASSET: &str = "current_asset";
    /// Receivables.
    pub const ACCOUNTS_RECEIVABLE: &str = "accounts_receivable";
    /// Current liability.
    pub const CURRENT_LIABILITY: &str = "current_liability";
    /// Long-term liability.
    pub const LONG_TERM_LIABILITY: &str = "long_term_liability";
}

/// Which side of a posting increases an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalSide {
    /// Positive amounts increase the balance (asset, expense).
    Debit,
    /// Negative amounts increase the balance (liability, equity, revenue).
    Credit,
}

/// Account classification.
///
/// Declaration order is the presentation order of the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owners' residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types in presentation order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Returns the normal balance side for this type.
    #[must_use]
    pub const fn normal_side(self) -> NormalSide {
        match self {
            Self::Asset | Self::Expense => NormalSide::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalSide::Credit,
        }
    }

    /// Returns +1 for debit-normal types and -1 for credit-normal types.
    #[must_use]
    pub const fn display_sign(self) -> Decimal {
        match self.normal_side() {
            NormalSide::Debit => Decimal::ONE,
            NormalSide::Credit => Decimal::NEGATIVE_ONE,
        }
    }

    /// Converts a raw line sum into the amount shown on a statement.
    ///
    /// Debit-normal accounts show the sum as-is; credit-normal accounts show
    /// its negation, so a net credit on revenue displays as a positive number.
    #[must_use]
    pub fn display_amount(self, net: Decimal) -> Decimal {
        match self.normal_side() {
            NormalSide::Debit => net,
            NormalSide::Credit => -net,
        }
    }

    /// Returns true for the balance sheet types (asset, liability, equity).
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            _ => Err(AccountError::UnknownAccountType(s.to_string())),
        }
    }
}

/// One ledger account in a company's chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Short sort key, unique per company (e.g. "1000").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification. Immutable once postings exist.
    pub account_type: AccountType,
    /// Free-form refinement (see [`subtype`]).
    pub sub_type: Option<String>,
    /// Parent account of the same type.
    pub parent_id: Option<AccountId>,
    /// Bank account flag; bank accounts are cash accounts.
    pub is_bank_account: bool,
    /// Control account flag (receivables, payables).
    pub is_control_account: bool,
    /// Protected account: cannot be edited or deleted.
    pub is_system: bool,
    /// Inactive accounts are hidden from the chart but keep their history.
    pub is_active: bool,
    /// Denormalized signed line sum over posted transactions.
    ///
    /// A cache only; reports always recompute from lines.
    pub current_balance: Decimal,
    /// Account currency (the company currency).
    pub currency: CurrencyCode,
    /// Optional tax category label.
    pub tax_category: Option<String>,
}

impl Account {
    /// Returns true if this account holds cash (bank flag or `cash` subtype).
    #[must_use]
    pub fn is_cash(&self) -> bool {
        self.is_bank_account || self.sub_type.as_deref() == Some(subtype::CASH)
    }

    /// Returns true if this is a fixed asset account.
    #[must_use]
    pub fn is_fixed_asset(&self) -> bool {
        self.account_type == AccountType::Asset
            && self.sub_type.as_deref() == Some(subtype::FIXED_ASSET)
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Owning company.
    pub company_id: CompanyId,
    /// Account code (must be unique within the company).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Optional subtype.
    pub sub_type: Option<String>,
    /// Optional parent of the same type.
    pub parent_id: Option<AccountId>,
    /// Bank account flag.
    pub is_bank_account: bool,
    /// Control account flag.
    pub is_control_account: bool,
    /// System flag. User-created accounts leave this false.
    pub is_system: bool,
    /// Optional tax category.
    pub tax_category: Option<String>,
}

impl NewAccount {
    /// Creates an input with the required fields and every flag cleared.
    #[must_use]
    pub fn new(
        company_id: CompanyId,
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            company_id,
            code: code.into(),
            name: name.into(),
            account_type,
            sub_type: None,
            parent_id: None,
            is_bank_account: false,
            is_control_account: false,
            is_system: false,
            tax_category: None,
        }
    }

    /// Sets the subtype.
    #[must_use]
    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }

    /// Sets the parent account.
    #[must_use]
    pub fn with_parent(mut self, parent_id: AccountId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Marks the account as a bank account.
    #[must_use]
    pub fn bank(mut self) -> Self {
        self.is_bank_account = true;
        self
    }

    /// Marks the account as a control account.
    #[must_use]
    pub fn control(mut self) -> Self {
        self.is_control_account = true;
        self
    }

    /// Marks the account as a protected system account.
    #[must_use]
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }
}

/// Partial update for an account. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    /// New code.
    pub code: Option<String>,
    /// New name.
    pub name: Option<String>,
    /// New type (only while the account has no postings).
    pub account_type: Option<AccountType>,
    /// New subtype (`Some(None)` clears it).
    pub sub_type: Option<Option<String>>,
    /// New parent (`Some(None)` makes the account a root).
    pub parent_id: Option<Option<AccountId>>,
    /// New bank flag.
    pub is_bank_account: Option<bool>,
    /// New control flag.
    pub is_control_account: Option<bool>,
    /// New tax category (`Some(None)` clears it).
    pub tax_category: Option<Option<String>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Result of a deletion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionOutcome {
    /// The account had no lines and was removed.
    Deleted,
    /// The account has lines and was deactivated instead.
    Deactivated,
}

/// Filter used when fetching accounts from the store.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Restrict to these types (empty = all).
    pub types: Vec<AccountType>,
    /// Restrict by active flag.
    pub is_active: Option<bool>,
    /// Restrict by bank flag.
    pub is_bank_account: Option<bool>,
    /// Only cash accounts (bank flag or `cash` subtype).
    pub cash_only: bool,
    /// Case-insensitive substring over code and name.
    pub search: Option<String>,
}

impl AccountFilter {
    /// Matches every account.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Active accounts of the given types.
    #[must_use]
    pub fn active_of(types: &[AccountType]) -> Self {
        Self {
            types: types.to_vec(),
            is_active: Some(true),
            ..Self::default()
        }
    }

    /// Cash accounts regardless of active flag.
    #[must_use]
    pub fn cash() -> Self {
        Self {
            cash_only: true,
            ..Self::default()
        }
    }

    /// Returns true if the account passes every criterion.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        if !self.types.is_empty() && !self.types.contains(&account.account_type) {
            return false;
        }
        if self.is_active.is_some_and(|active| account.is_active != active) {
            return false;
        }
        if self
            .is_bank_account
            .is_some_and(|bank| account.is_bank_account != bank)
        {
            return false;
        }
        if self.cash_only && !account.is_cash() {
            return false;
        }
        if let Some(search) = self.search.as_deref() {
            let needle = search.to_lowercase();
            if !account.code.to_lowercase().contains(&needle)
                && !account.name.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

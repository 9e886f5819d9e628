//! Company context for ledger queries.

use serde::{Deserialize, Serialize};
use tally_shared::types::{CompanyId, CurrencyCode};

/// A company owning a chart of accounts and a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier.
    pub id: CompanyId,
    /// Display name.
    pub name: String,
    /// Reporting currency. Every report amount is tagged with it.
    pub currency: CurrencyCode,
}

impl Company {
    /// Creates a company with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>, currency: CurrencyCode) -> Self {
        Self {
            id: CompanyId::new(),
            name: name.into(),
            currency,
        }
    }
}

//! Default chart of accounts and demo postings.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_core::account::{AccountType, NewAccount, subtype};
use tally_shared::types::CompanyId;

/// One row of the default chart.
pub struct ChartEntry {
    pub code: &'static str,
    pub name: &'static str,
    pub account_type: AccountType,
    pub sub_type: Option<&'static str>,
    pub bank: bool,
    pub control: bool,
    pub system: bool,
}

impl ChartEntry {
    const fn new(code: &'static str, name: &'static str, account_type: AccountType) -> Self {
        Self {
            code,
            name,
            account_type,
            sub_type: None,
            bank: false,
            control: false,
            system: false,
        }
    }

    const fn sub_type(mut self, sub_type: &'static str) -> Self {
        self.sub_type = Some(sub_type);
        self
    }

    const fn bank(mut self) -> Self {
        self.bank = true;
        self
    }

    const fn control(mut self) -> Self {
        self.control = true;
        self
    }

    const fn system(mut self) -> Self {
        self.system = true;
        self
    }

    /// Builds the account input for a company.
    pub fn to_input(&self, company_id: CompanyId) -> NewAccount {
        let mut input = NewAccount::new(company_id, self.code, self.name, self.account_type);
        input.sub_type = self.sub_type.map(str::to_string);
        input.is_bank_account = self.bank;
        input.is_control_account = self.control;
        input.is_system = self.system;
        input
    }
}

use AccountType::{Asset, Equity, Expense, Liability, Revenue};

/// The chart every demo company starts with.
pub const DEFAULT_CHART: &[ChartEntry] = &[
    // Assets (1000-1999)
    ChartEntry::new("1000", "Cash", Asset).sub_type(subtype::CASH).bank().system(),
    ChartEntry::new("1010", "Checking Account", Asset).sub_type(subtype::CURRENT_ASSET).bank(),
    ChartEntry::new("1020", "Savings Account", Asset).sub_type(subtype::CURRENT_ASSET).bank(),
    ChartEntry::new("1200", "Accounts Receivable", Asset)
        .sub_type(subtype::ACCOUNTS_RECEIVABLE)
        .control()
        .system(),
    ChartEntry::new("1300", "Inventory", Asset).sub_type(subtype::CURRENT_ASSET),
    ChartEntry::new("1500", "Office Equipment", Asset).sub_type(subtype::FIXED_ASSET),
    ChartEntry::new("1600", "Accumulated Depreciation", Asset).sub_type(subtype::FIXED_ASSET),
    // Liabilities (2000-2999)
    ChartEntry::new("2000", "Accounts Payable", Liability)
        .sub_type(subtype::CURRENT_LIABILITY)
        .control()
        .system(),
    ChartEntry::new("2100", "Sales Tax Payable", Liability)
        .sub_type(subtype::CURRENT_LIABILITY)
        .system(),
    ChartEntry::new("2200", "Credit Card Payable", Liability).sub_type(subtype::CURRENT_LIABILITY),
    ChartEntry::new("2500", "Long-term Debt", Liability).sub_type(subtype::LONG_TERM_LIABILITY),
    // Equity (3000-3999)
    ChartEntry::new("3000", "Owner's Equity", Equity).system(),
    ChartEntry::new("3100", "Retained Earnings", Equity).system(),
    ChartEntry::new("3900", "Current Year Earnings", Equity).system(),
    // Revenue (4000-4999)
    ChartEntry::new("4000", "Sales Revenue", Revenue).system(),
    ChartEntry::new("4100", "Service Revenue", Revenue),
    ChartEntry::new("4200", "Other Income", Revenue),
    // Expenses (5000-7999)
    ChartEntry::new("5000", "Cost of Goods Sold", Expense),
    ChartEntry::new("6000", "Operating Expenses", Expense).system(),
    ChartEntry::new("6100", "Salaries and Wages", Expense),
    ChartEntry::new("6200", "Rent Expense", Expense),
    ChartEntry::new("6300", "Utilities", Expense),
    ChartEntry::new("6400", "Office Supplies", Expense),
    ChartEntry::new("6500", "Travel and Meals", Expense),
    ChartEntry::new("6600", "Software and Subscriptions", Expense),
    ChartEntry::new("6700", "Marketing and Advertising", Expense),
    ChartEntry::new("6800", "Professional Fees", Expense),
    ChartEntry::new("6900", "Insurance", Expense),
    ChartEntry::new("7000", "Depreciation Expense", Expense),
];

/// A two-line demo posting: debit one code, credit another.
pub struct SamplePosting {
    pub date: (i32, u32, u32),
    pub description: &'static str,
    pub reference: &'static str,
    pub debit: &'static str,
    pub credit: &'static str,
    /// Amount in cents.
    pub cents: i64,
}

impl SamplePosting {
    pub fn date(&self) -> Option<NaiveDate> {
        let (y, m, d) = self.date;
        NaiveDate::from_ymd_opt(y, m, d)
    }

    pub fn amount(&self) -> Decimal {
        Decimal::new(self.cents, 2)
    }
}

/// Posted transactions seeded for the demo company.
pub const SAMPLE_POSTINGS: &[SamplePosting] = &[
    SamplePosting {
        date: (2024, 1, 2),
        description: "Owner investment",
        reference: "CAP-001",
        debit: "1010",
        credit: "3000",
        cents: 5_000_000,
    },
    SamplePosting {
        date: (2024, 1, 5),
        description: "Office equipment purchase",
        reference: "PO-1001",
        debit: "1500",
        credit: "1010",
        cents: 480_000,
    },
    SamplePosting {
        date: (2024, 1, 15),
        description: "Bank loan proceeds",
        reference: "LOAN-01",
        debit: "1010",
        credit: "2500",
        cents: 2_000_000,
    },
    SamplePosting {
        date: (2024, 1, 20),
        description: "Consulting engagement",
        reference: "INV-0001",
        debit: "1010",
        credit: "4100",
        cents: 750_000,
    },
    SamplePosting {
        date: (2024, 1, 31),
        description: "January rent",
        reference: "RENT-2401",
        debit: "6200",
        credit: "1010",
        cents: 200_000,
    },
    SamplePosting {
        date: (2024, 2, 10),
        description: "Product sale on account",
        reference: "INV-0002",
        debit: "1200",
        credit: "4000",
        cents: 320_000,
    },
    SamplePosting {
        date: (2024, 2, 25),
        description: "Customer payment",
        reference: "PMT-0002",
        debit: "1010",
        credit: "1200",
        cents: 320_000,
    },
    SamplePosting {
        date: (2024, 2, 28),
        description: "February payroll",
        reference: "PAY-2402",
        debit: "6100",
        credit: "1010",
        cents: 600_000,
    },
    SamplePosting {
        date: (2024, 2, 29),
        description: "Petty cash withdrawal",
        reference: "PC-0001",
        debit: "1000",
        credit: "1010",
        cents: 25_000,
    },
];

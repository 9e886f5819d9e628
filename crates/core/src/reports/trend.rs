//! Calendar bucketing for trends.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::WeekStart;

use super::error::ReportError;
use super::types::{TrendKind, TrendPoint};

/// Trend bucket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// Key `YYYY-MM-DD`.
    Day,
    /// Key is the week's first day as `YYYY-MM-DD`.
    Week,
    /// Key `YYYY-MM`.
    Month,
    /// Key `YYYY-Qn`.
    Quarter,
    /// Key `YYYY`.
    Year,
}

impl Interval {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// First day of the bucket containing `date`.
    #[must_use]
    pub fn bucket_start(self, date: NaiveDate, week_start: WeekStart) -> NaiveDate {
        let back = match self {
            Self::Day => 0,
            Self::Week => {
                let first = week_start.weekday().num_days_from_sunday();
                (date.weekday().num_days_from_sunday() + 7 - first) % 7
            }
            Self::Month => date.day0(),
            Self::Quarter => {
                let first_month = date.month0() - date.month0() % 3;
                return date
                    .with_day(1)
                    .and_then(|d| d.with_month0(first_month))
                    .unwrap_or(date);
            }
            Self::Year => date.ordinal0(),
        };
        date.checked_sub_days(Days::new(u64::from(back)))
            .unwrap_or(date)
    }

    /// Key for the bucket starting at `start`.
    #[must_use]
    pub fn key(self, start: NaiveDate) -> String {
        match self {
            Self::Day | Self::Week => start.format("%Y-%m-%d").to_string(),
            Self::Month => start.format("%Y-%m").to_string(),
            Self::Quarter => format!("{}-Q{}", start.year(), start.month0() / 3 + 1),
            Self::Year => start.format("%Y").to_string(),
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Interval {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            _ => Err(ReportError::UnsupportedInterval(s.to_string())),
        }
    }
}

impl std::str::FromStr for TrendKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "revenue" => Ok(Self::Revenue),
            "expense" | "expenses" => Ok(Self::Expense),
            "cash_flow" | "cash-flow" | "cashflow" => Ok(Self::CashFlow),
            _ => Err(ReportError::UnsupportedTrendKind(s.to_string())),
        }
    }
}

/// Sums dated amounts into buckets, ascending, skipping empty ones.
pub fn bucket(
    amounts: impl IntoIterator<Item = (NaiveDate, Decimal)>,
    interval: Interval,
    week_start: WeekStart,
) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for (date, amount) in amounts {
        *buckets
            .entry(interval.bucket_start(date, week_start))
            .or_default() += amount;
    }
    buckets
        .into_iter()
        .map(|(start, amount)| TrendPoint {
            period: interval.key(start),
            amount,
        })
        .collect()
}

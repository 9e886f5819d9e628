//! Date windows for ledger queries.

use std::ops::Bound;

use chrono::NaiveDate;

use super::error::LedgerStoreError;

/// A window of accounting dates.
///
/// The start is inclusive. The end is inclusive for ranges and as-of
/// queries, and exclusive for opening balances ("strictly before").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    start: Option<NaiveDate>,
    end: Bound<NaiveDate>,
}

impl Period {
    /// Every date.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            start: None,
            end: Bound::Unbounded,
        }
    }

    /// `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriod` if `end` is before `start`.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self, LedgerStoreError> {
        if end < start {
            return Err(LedgerStoreError::InvalidPeriod { start, end });
        }
        Ok(Self {
            start: Some(start),
            end: Bound::Included(end),
        })
    }

    /// Every date up to and including `date`.
    #[must_use]
    pub const fn as_of(date: NaiveDate) -> Self {
        Self {
            start: None,
            end: Bound::Included(date),
        }
    }

    /// Every date strictly before `date`.
    #[must_use]
    pub const fn before(date: NaiveDate) -> Self {
        Self {
            start: None,
            end: Bound::Excluded(date),
        }
    }

    /// Inclusive lower bound, if any.
    #[must_use]
    pub const fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    /// Upper bound.
    #[must_use]
    pub const fn end(&self) -> Bound<NaiveDate> {
        self.end
    }

    /// Returns true if `date` falls in the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        if self.start.is_some_and(|start| date < start) {
            return false;
        }
        match self.end {
            Bound::Included(end) => date <= end,
            Bound::Excluded(end) => date < end,
            Bound::Unbounded => true,
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_between_is_inclusive() {
        let march = Period::between(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        assert!(march.contains(date(2024, 3, 1)));
        assert!(march.contains(date(2024, 3, 31)));
        assert!(!march.contains(date(2024, 2, 29)));
        assert!(!march.contains(date(2024, 4, 1)));
    }

    #[test]
    fn test_single_day_range() {
        let day = Period::between(date(2024, 3, 1), date(2024, 3, 1)).unwrap();
        assert!(day.contains(date(2024, 3, 1)));
    }

    #[test]
    fn test_between_rejects_reversed_range() {
        let err = Period::between(date(2024, 3, 31), date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, LedgerStoreError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_as_of_and_before() {
        let as_of = Period::as_of(date(2024, 3, 31));
        assert!(as_of.contains(date(1999, 1, 1)));
        assert!(as_of.contains(date(2024, 3, 31)));
        assert!(!as_of.contains(date(2024, 4, 1)));

        let before = Period::before(date(2024, 3, 1));
        assert!(before.contains(date(2024, 2, 29)));
        assert!(!before.contains(date(2024, 3, 1)));
    }

    #[test]
    fn test_all() {
        assert!(Period::all().contains(NaiveDate::MIN));
        assert!(Period::default().contains(NaiveDate::MAX));
    }
}

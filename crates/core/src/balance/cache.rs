//! Computed account balance caching using Moka.
//!
//! Entries are keyed by the ledger revision, so any write to a company's
//! ledger makes its older entries unreachable; they age out by TTL.

use std::time::Duration;

use moka::sync::Cache;
use tally_shared::types::{AccountId, CompanyId};

use super::accumulator::AccountActivity;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Cache key: one account at one ledger revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BalanceKey {
    /// Owning company.
    pub company_id: CompanyId,
    /// Account.
    pub account_id: AccountId,
    /// Ledger revision the value was computed at.
    pub revision: u64,
}

/// Cache of all-time account activity.
#[derive(Clone)]
pub struct BalanceCache {
    cache: Cache<BalanceKey, AccountActivity>,
}

impl BalanceCache {
    /// Creates a cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .support_invalidation_closures()
            .build();

        Self { cache }
    }

    /// Returns the cached activity, or computes and stores it.
    ///
    /// The flag is true on a cache hit.
    ///
    /// # Errors
    ///
    /// Propagates the error from `compute`; nothing is cached then.
    pub fn get_or_try_compute<E>(
        &self,
        key: BalanceKey,
        compute: impl FnOnce() -> Result<AccountActivity, E>,
    ) -> Result<(AccountActivity, bool), E> {
        if let Some(hit) = self.cache.get(&key) {
            return Ok((hit, true));
        }
        let activity = compute()?;
        self.cache.insert(key, activity);
        Ok((activity, false))
    }

    /// Drops every entry for a company.
    pub fn invalidate_company(&self, company_id: CompanyId) {
        // Closures are enabled in the builder, so this cannot fail.
        let _ = self
            .cache
            .invalidate_entries_if(move |key, _| key.company_id == company_id);
    }

    /// Drops every entry.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs pending maintenance so counts and evictions are up to date.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for BalanceCache {
    fn default() -> Self {
        Self::new()
    }
}

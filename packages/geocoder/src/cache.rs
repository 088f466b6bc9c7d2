//! In-process geocoding result cache.
//!
//! Caches both successful geocodes (with coordinates) and, when asked to,
//! known misses (no coordinates) so the same address is not re-queried
//! within the time-to-live. Errors are never cached.
//!
//! Time is read from [`tokio::time::Instant`], so tests can drive expiry
//! with a paused clock.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::GeoCoordinate;

/// Default time-to-live for cached results.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Cache key: the exact corrected address and the locality it was
/// resolved in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    /// Corrected address, as passed to the resolver.
    pub address: String,
    /// Locality qualifier (e.g. `"Conchalí"`).
    pub locality: String,
}

impl CacheKey {
    /// Builds a key from borrowed parts.
    #[must_use]
    pub fn new(address: &str, locality: &str) -> Self {
        Self {
            address: address.to_owned(),
            locality: locality.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    coordinate: Option<GeoCoordinate>,
    expires_at: Instant,
}

/// Thread-safe TTL cache of geocoding outcomes.
#[derive(Debug)]
pub struct GeocodeCache {
    ttl: Duration,
    entries: Mutex<BTreeMap<CacheKey, CacheEntry>>,
}

impl Default for GeocodeCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl GeocodeCache {
    /// Creates an empty cache whose entries live for `ttl`.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// The configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Looks up a live entry.
    ///
    /// Returns `None` on a miss, `Some(None)` for a cached "not found" and
    /// `Some(Some(coordinate))` for a cached hit. An expired entry is
    /// evicted and reported as a miss.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Option<GeoCoordinate>> {
        let mut entries = self.lock();
        let entry = *entries.get(key)?;
        if Instant::now() >= entry.expires_at {
            entries.remove(key);
            return None;
        }
        Some(entry.coordinate)
    }

    /// Stores an outcome, replacing any previous entry for `key`.
    ///
    /// Expired entries for other keys are evicted on the way, so the map
    /// never holds more than one time-to-live worth of distinct addresses.
    pub fn insert(&self, key: CacheKey, coordinate: Option<GeoCoordinate>) {
        let now = Instant::now();
        let mut entries = self.lock();
        let evicted = evict_expired(&mut entries, now);
        if evicted > 0 {
            log::trace!("Evicted {evicted} expired geocode cache entries");
        }
        entries.insert(
            key,
            CacheEntry {
                coordinate,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Removes every expired entry, returning how many were evicted.
    pub fn purge_expired(&self) -> usize {
        evict_expired(&mut self.lock(), Instant::now())
    }

    /// Number of stored entries, including ones that expired but have not
    /// been evicted yet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

fn evict_expired(entries: &mut BTreeMap<CacheKey, CacheEntry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, e| now < e.expires_at);
    before - entries.len()
}

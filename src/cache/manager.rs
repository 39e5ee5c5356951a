//! Expiring cache persisted through a pluggable storage backend
//!
//! Provides an `ExpiringCache` that memoizes fetched data with a per-entry
//! time-to-live. Stale entries read as absent and are purged lazily on the
//! next `get`. Storage problems degrade to cache misses rather than errors.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

use super::storage::CacheStorage;

/// One cached payload as stored in the persisted table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// The cached data
    payload: Value,
    /// When the data was cached
    created_at: DateTime<Utc>,
    /// Time-to-live in milliseconds
    ttl_ms: u64,
}

impl CacheEntry {
    /// Valid while less than `ttl` has passed since `created_at`
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let ttl = Duration::milliseconds(i64::try_from(self.ttl_ms).unwrap_or(i64::MAX));
        now.signed_duration_since(self.created_at) < ttl
    }
}

type CacheTable = BTreeMap<String, CacheEntry>;

/// Key-value cache with per-entry expiry
///
/// The full table is rewritten on every mutation, so a crash loses at most
/// the write in flight. Concurrent writers sharing one backend race on that
/// overwrite and the last writer wins.
#[derive(Debug)]
pub struct ExpiringCache<S: CacheStorage> {
    storage: S,
}

impl<S: CacheStorage> ExpiringCache<S> {
    /// Creates a cache over the given backend
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The backend, for direct inspection
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Stores `payload` under `key` for `ttl`, replacing any existing entry.
    ///
    /// TTLs have millisecond precision. A payload that fails to serialize or
    /// a failed write is logged and dropped; the next `get` simply misses.
    pub fn put<T: Serialize>(&self, key: &str, payload: &T, ttl: StdDuration) {
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "cache payload not serializable, skipping put");
                return;
            }
        };

        let Some(mut table) = self.load() else {
            warn!(key, "cache storage unreadable, put dropped to keep prior entries");
            return;
        };
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        table.insert(
            key.to_string(),
            CacheEntry {
                payload,
                created_at: Utc::now(),
                ttl_ms,
            },
        );
        self.save(&table);
        debug!(key, ttl_ms, "cache put");
    }

    /// Returns the payload for `key` if present and still valid.
    ///
    /// A stale entry is removed from persisted storage as a side effect. A
    /// payload that does not deserialize into `T` is treated as a miss, as is
    /// unreadable storage.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut table = self.load()?;
        let entry = table.get(key)?;

        if !entry.is_valid_at(Utc::now()) {
            table.remove(key);
            self.save(&table);
            debug!(key, "cache entry expired, evicted");
            return None;
        }

        match serde_json::from_value(entry.payload.clone()) {
            Ok(payload) => {
                debug!(key, "cache hit");
                Some(payload)
            }
            Err(e) => {
                debug!(key, error = %e, "cached payload has unexpected shape");
                None
            }
        }
    }

    /// Drops a single entry, if present
    pub fn remove(&self, key: &str) {
        let Some(mut table) = self.load() else {
            warn!(key, "cache storage unreadable, remove dropped");
            return;
        };
        if table.remove(key).is_some() {
            self.save(&table);
        }
    }

    /// Removes every entry. Safe to call on an empty cache.
    pub fn clear(&self) {
        self.save(&CacheTable::new());
        debug!("cache cleared");
    }

    /// Number of persisted entries, stale ones included
    pub fn len(&self) -> usize {
        self.load().map_or(0, |table| table.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the table. Missing or corrupt storage is an empty table.
    ///
    /// Returns `None` when storage cannot be read at all: the entries may
    /// still be there, so callers must not write a table built from nothing.
    fn load(&self) -> Option<CacheTable> {
        let blob = match self.storage.read() {
            Ok(Some(blob)) => blob,
            Ok(None) => return Some(CacheTable::new()),
            Err(e) => {
                warn!(error = %e, "cache storage unreadable");
                return None;
            }
        };
        Some(serde_json::from_str(&blob).unwrap_or_else(|e| {
            warn!(error = %e, "cache storage corrupt, treating as empty");
            CacheTable::new()
        }))
    }

    /// Persists the table; failures are logged and dropped
    fn save(&self, table: &CacheTable) {
        let blob = match serde_json::to_string(table) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "cache table not serializable, write dropped");
                return;
            }
        };
        if let Err(e) = self.storage.write(&blob) {
            warn!(error = %e, "cache write failed, dropped");
        }
    }
}

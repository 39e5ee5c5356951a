//! Cache module for memoizing fetched data across restarts
//!
//! This module provides an expiring key-value cache whose table is persisted
//! through an injected storage backend. Entries carry a TTL; stale entries
//! read as absent and are evicted lazily. The cache is an optimization, so
//! storage failures degrade to misses instead of surfacing as errors.

mod manager;
mod storage;

pub use manager::ExpiringCache;
pub use storage::{CacheStorage, FileStorage, MemoryStorage};

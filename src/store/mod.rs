//! Key-value store abstraction.
//!
//! All persistent state lives in a hosted key-value store reached through
//! the [`KvStore`] trait. Two implementations exist: [`RedisStore`] for
//! production and [`MemoryStore`], a process-local substitute used when no
//! store is configured (development only). The implementation is selected
//! once at startup; handlers only ever see an `Arc<dyn KvStore>`.
//!
//! ## Key Patterns
//!
//! ```text
//! visits:total               → all-time visit counter (INCR)
//! visits:daily:{YYYY-MM-DD}  → per-UTC-day visit counter (INCR)
//! visits:countries           → per-country visit counts (HINCRBY)
//! visits:recent              → newest-first visit log, capped (LPUSH/LTRIM)
//! push:subscriptions         → JSON blob: user id → subscription list
//! backup:index               → JSON list of snapshot index entries
//! backup:{YYYY-MM-DD}        → one serialized dashboard snapshot
//! content:{section}          → dashboard section data (written by the CMS)
//! ```

mod memory;
mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use std::collections::HashMap;

use crate::error::AppResult;

/// Store keys used across services
pub mod keys {
    pub const TOTAL_VISITS: &str = "visits:total";
    pub const COUNTRY_VISITS: &str = "visits:countries";
    pub const RECENT_VISITS: &str = "visits:recent";
    pub const SUBSCRIPTIONS: &str = "push:subscriptions";
    pub const BACKUP_INDEX: &str = "backup:index";

    pub fn daily_visits(date: &str) -> String {
        format!("visits:daily:{}", date)
    }

    pub fn backup(date: &str) -> String {
        format!("backup:{}", date)
    }

    pub fn content(section: &str) -> String {
        format!("content:{}", section)
    }
}

/// Key-value store interface.
///
/// Increments are atomic per key at the store level; multi-key sequences
/// carry no transaction guarantee.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Increment an integer value, creating it at 0 if absent.
    async fn incr(&self, key: &str) -> AppResult<i64>;

    /// Increment an integer hash field, creating it at 0 if absent.
    async fn hincr(&self, key: &str, field: &str) -> AppResult<i64>;

    async fn hgetall(&self, key: &str) -> AppResult<HashMap<String, String>>;

    /// Push a value to the front of a list.
    async fn lpush(&self, key: &str, value: &str) -> AppResult<()>;

    /// Trim a list to the inclusive index range `start..=stop`.
    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> AppResult<()>;

    /// Read the inclusive index range `start..=stop` of a list.
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> AppResult<Vec<String>>;
}

//! Process-local key-value store.
//!
//! Development substitute for the hosted store, selected when no Redis URL
//! is configured. State lives in a single process and is lost on restart;
//! not a production store.

use std::collections::{HashMap, VecDeque};

use tokio::sync::Mutex;

use crate::error::AppResult;
use crate::store::KvStore;

#[derive(Default)]
struct Inner {
    strings: HashMap<String, String>,
    hashes: HashMap<String, HashMap<String, i64>>,
    lists: HashMap<String, VecDeque<String>>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Normalize a Redis-style index (negative = from the end) into a bound
/// suitable for slicing a list of length `len`.
fn normalize(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        (index as usize).min(len)
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let inner = self.inner.lock().await;
        Ok(inner.strings.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.strings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.strings.remove(key);
        inner.hashes.remove(key);
        inner.lists.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        let mut inner = self.inner.lock().await;
        let current = inner
            .strings
            .get(key)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        let next = current + 1;
        inner.strings.insert(key.to_string(), next.to_string());
        Ok(next)
    }

    async fn hincr(&self, key: &str, field: &str) -> AppResult<i64> {
        let mut inner = self.inner.lock().await;
        let entry = inner
            .hashes
            .entry(key.to_string())
            .or_default()
            .entry(field.to_string())
            .or_insert(0);
        *entry += 1;
        Ok(*entry)
    }

    async fn hgetall(&self, key: &str) -> AppResult<HashMap<String, String>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .hashes
            .get(key)
            .map(|h| {
                h.iter()
                    .map(|(field, count)| (field.clone(), count.to_string()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn lpush(&self, key: &str, value: &str) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner
            .lists
            .entry(key.to_string())
            .or_default()
            .push_front(value.to_string());
        Ok(())
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(list) = inner.lists.get_mut(key) {
            let len = list.len();
            let start = normalize(start, len);
            // Stop bound is inclusive
            let stop = normalize(stop, len).saturating_add(1).min(len);
            let trimmed: VecDeque<String> = if start >= stop {
                VecDeque::new()
            } else {
                list.iter().skip(start).take(stop - start).cloned().collect()
            };
            *list = trimmed;
        }
        Ok(())
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> AppResult<Vec<String>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .lists
            .get(key)
            .map(|list| {
                let len = list.len();
                let start = normalize(start, len);
                let stop = normalize(stop, len).saturating_add(1).min(len);
                if start >= stop {
                    Vec::new()
                } else {
                    list.iter().skip(start).take(stop - start).cloned().collect()
                }
            })
            .unwrap_or_default())
    }
}

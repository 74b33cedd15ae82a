//! Cache store implementations.

use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Minimal key-value contract the translation cache is built on.
///
/// A zero TTL means the entry does not expire.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;
    /// Reset the TTL of an existing entry. Returns false if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;
    async fn delete(&self, key: &str) -> Result<bool>;
    fn name(&self) -> &'static str;
}

#[derive(Clone)]
struct StoreEntry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl StoreEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: deadline(ttl),
        }
    }
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

fn deadline(ttl: Duration) -> Option<Instant> {
    if ttl.is_zero() {
        None
    } else {
        Some(Instant::now() + ttl)
    }
}

/// Capacity of the in-process store when none is configured.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Bounded in-process store with least-recently-used eviction.
///
/// A capacity of zero retains nothing.
pub struct MemoryStore {
    entries: Mutex<LruCache<String, StoreEntry>>,
    capacity: usize,
}

impl MemoryStore {
    pub fn new(max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            capacity: max_entries,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock()
            .map(|entries| entries.iter().filter(|(_, e)| !e.is_expired()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, LruCache<String, StoreEntry>>> {
        self.entries.lock().map_err(|_| {
            Error::cache_with_context(
                "memory store poisoned",
                ErrorContext::new().with_source("memory_store"),
            )
        })
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.lock()?;
        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.data.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        Ok(None)
    }
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        if self.capacity == 0 {
            return Ok(());
        }
        self.lock()?
            .put(key.to_string(), StoreEntry::new(value.to_vec(), ttl));
        Ok(())
    }
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut entries = self.lock()?;
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.expires_at = deadline(ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.pop(key).is_some())
    }
    fn name(&self) -> &'static str {
        "memory"
    }
}

pub struct NullStore;
impl NullStore {
    pub fn new() -> Self {
        Self
    }
}
impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for NullStore {
    async fn get(&self, _: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
    async fn set(&self, _: &str, _: &[u8], _: Duration) -> Result<()> {
        Ok(())
    }
    async fn expire(&self, _: &str, _: Duration) -> Result<bool> {
        Ok(false)
    }
    async fn delete(&self, _: &str) -> Result<bool> {
        Ok(false)
    }
    fn name(&self) -> &'static str {
        "null"
    }
}

//! Translation cache policy on top of a [`CacheStore`].

use super::backend::CacheStore;
use super::key::{CacheKey, CacheKeyGenerator};
use crate::types::TranslationResult;
use crate::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Stores [`TranslationResult`]s as JSON under content-derived keys.
pub struct TranslationCache {
    store: Arc<dyn CacheStore>,
    keys: CacheKeyGenerator,
    stats: AtomicStats,
}

impl TranslationCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            keys: CacheKeyGenerator::new(),
            stats: AtomicStats::default(),
        }
    }

    pub fn with_key_generator(mut self, keys: CacheKeyGenerator) -> Self {
        self.keys = keys;
        self
    }

    pub fn key_for(&self, text: &str, from: &str, to: &str) -> CacheKey {
        self.keys.generate(text, from, to)
    }

    /// Look up a stored result. Undecodable entries count as errors and read as a miss.
    pub async fn get(&self, key: &CacheKey) -> Result<Option<TranslationResult>> {
        match self.store.get(key.as_str()).await {
            Ok(Some(data)) => match serde_json::from_slice::<TranslationResult>(&data) {
                Ok(result) => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    Ok(Some(result))
                }
                Err(_) => {
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    Ok(None)
                }
            },
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Write a result through. The stored copy never carries `cache_hit = true`.
    pub async fn put(&self, key: &CacheKey, result: &TranslationResult, ttl: Duration) -> Result<()> {
        let data = serde_json::to_vec(&result.as_cacheable())?;
        match self.store.set(key.as_str(), &data, ttl).await {
            Ok(()) => {
                self.stats.sets.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub async fn invalidate(&self, key: &CacheKey) -> Result<bool> {
        self.store.delete(key.as_str()).await
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }
}

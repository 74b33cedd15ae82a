//! 翻译缓存模块：在可插拔的键值存储之上实现翻译结果缓存策略。
//!
//! # Translation Caching Module
//!
//! This module defines the caching *policy* the router applies on top of an
//! external key-value store. The store itself is injected through the
//! [`CacheStore`] trait (get / set / expire), so production deployments can plug
//! in a shared store while tests use [`MemoryStore`].
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`TranslationCache`] | Serializes results, applies TTL, tracks hit/miss statistics |
//! | [`CacheStore`] | Minimal key-value contract consumed by the cache |
//! | [`MemoryStore`] | Bounded in-process LRU store |
//! | [`NullStore`] | Store that never retains anything |
//! | [`CacheKeyGenerator`] | Content-derived, namespaced keys |
//!
//! ## Cache Key Generation
//!
//! Keys depend only on `(text, source language, target language)`, never on the
//! backend that produced the translation:
//!
//! ```rust
//! use translation_router::cache::cache_key;
//!
//! let key = cache_key("Hallo", "de", "zh");
//! assert!(key.as_str().starts_with("translation:"));
//! assert_eq!(key, cache_key("Hallo", "de", "zh"));
//! ```

mod backend;
mod key;
mod manager;

pub use backend::{CacheStore, MemoryStore, NullStore, DEFAULT_MAX_ENTRIES};
pub use key::{cache_key, CacheKey, CacheKeyGenerator, DEFAULT_NAMESPACE};
pub use manager::{CacheStats, TranslationCache};

//! Scriptable in-memory backends and stores shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use translation_router::backends::{BackendKind, TranslationBackend};
use translation_router::cache::{CacheStore, MemoryStore};
use translation_router::types::{BackendUsage, TranslationRequest, TranslationResult};
use translation_router::usage::{FixedClock, UsageTracker};
use translation_router::{BackendError, Error, ErrorContext, FailureClass};

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

/// What the next `translate` call does.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Succeed with `"<id>:<text>"`.
    Echo,
    Fixed(String),
    Fail(FailureClass),
}

/// Backend whose health and translate outcome are set by the test, with call counters.
#[derive(Debug)]
pub struct FakeBackend {
    id: String,
    healthy: AtomicBool,
    outcome: Mutex<Outcome>,
    usage_fails: AtomicBool,
    pub health_calls: AtomicUsize,
    pub translate_calls: AtomicUsize,
    pub tracker: UsageTracker,
}

impl FakeBackend {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            healthy: AtomicBool::new(true),
            outcome: Mutex::new(Outcome::Echo),
            usage_fails: AtomicBool::new(false),
            health_calls: AtomicUsize::new(0),
            translate_calls: AtomicUsize::new(0),
            tracker: UsageTracker::new(Arc::new(FixedClock::new(day()))).with_daily_limit(1_000),
        })
    }

    pub fn unhealthy(id: &str) -> Arc<Self> {
        let backend = Self::new(id);
        backend.set_healthy(false);
        backend
    }

    pub fn failing(id: &str, class: FailureClass) -> Arc<Self> {
        let backend = Self::new(id);
        backend.set_outcome(Outcome::Fail(class));
        backend
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn set_outcome(&self, outcome: Outcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn fail_usage(&self) {
        self.usage_fails.store(true, Ordering::SeqCst);
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn translate_calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationBackend for FakeBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> BackendKind {
        BackendKind::DeepL
    }

    async fn is_healthy(&self) -> bool {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.healthy.load(Ordering::SeqCst)
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, BackendError> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.lock().unwrap().clone();
        let text = match outcome {
            Outcome::Echo => format!("{}:{}", self.id, request.text()),
            Outcome::Fixed(text) => text,
            Outcome::Fail(class) => {
                return Err(BackendError::new(&self.id, class, format!("{} scripted", class)))
            }
        };
        self.tracker.record(request.char_count() as u64);
        Ok(TranslationResult::new(text, &self.id))
    }

    async fn usage(&self) -> Result<BackendUsage, BackendError> {
        if self.usage_fails.load(Ordering::SeqCst) {
            return Err(BackendError::new(
                &self.id,
                FailureClass::Transient,
                "usage endpoint down",
            ));
        }
        Ok(self.tracker.snapshot())
    }
}

/// Store whose every operation fails.
pub struct BrokenStore;

fn broken() -> Error {
    Error::cache_with_context("store offline", ErrorContext::new().with_source("broken_store"))
}

#[async_trait]
impl CacheStore for BrokenStore {
    async fn get(&self, _key: &str) -> translation_router::Result<Option<Vec<u8>>> {
        Err(broken())
    }
    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> translation_router::Result<()> {
        Err(broken())
    }
    async fn expire(&self, _key: &str, _ttl: Duration) -> translation_router::Result<bool> {
        Err(broken())
    }
    async fn delete(&self, _key: &str) -> translation_router::Result<bool> {
        Err(broken())
    }
    fn name(&self) -> &'static str {
        "broken"
    }
}

/// Memory store that remembers the TTL of every write.
pub struct RecordingStore {
    inner: MemoryStore,
    ttls: Mutex<Vec<Duration>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(64),
            ttls: Mutex::new(Vec::new()),
        })
    }

    pub fn ttls(&self) -> Vec<Duration> {
        self.ttls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CacheStore for RecordingStore {
    async fn get(&self, key: &str) -> translation_router::Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> translation_router::Result<()> {
        self.ttls.lock().unwrap().push(ttl);
        self.inner.set(key, value, ttl).await
    }
    async fn expire(&self, key: &str, ttl: Duration) -> translation_router::Result<bool> {
        self.inner.expire(key, ttl).await
    }
    async fn delete(&self, key: &str) -> translation_router::Result<bool> {
        self.inner.delete(key).await
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

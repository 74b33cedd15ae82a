//! 路由管理模块：按优先级在多个翻译后端之间选择、故障转移并写入缓存。
//!
//! # Routing Module
//!
//! [`TranslationRouter`] owns the backend registry, the route configuration and the
//! translation cache. A call resolves as:
//!
//! 1. cache lookup (when enabled), a hit returns without contacting any backend
//! 2. effective sequence: `[primary] + fallback`, deduplicated, registered ids only
//! 3. per backend: skip window check, health probe, translate
//! 4. first success is written through to the cache and returned
//! 5. otherwise [`Error::ExhaustedRoute`] with every attempt in try order
//!
//! | Failure class   | Decision                                   |
//! |-----------------|--------------------------------------------|
//! | `Unhealthy`     | next backend                               |
//! | `QuotaExceeded` | next backend                               |
//! | `Transient`     | next backend                               |
//! | `Unknown`       | next backend                               |
//! | `AuthFailure`   | per [`AuthFailurePolicy`]                  |
//!
//! The registry is a `RwLock<HashMap>` whose `Arc`s are cloned out before any await;
//! the configuration is an `ArcSwap` snapshot taken once per call, so a concurrent
//! [`TranslationRouter::update_config`] never affects a call already in flight.

mod builder;
mod config;
mod policy;

pub use builder::TranslationRouterBuilder;
pub use config::{RouteConfig, RouteConfigPatch, DEFAULT_CACHE_TTL_SECS};
pub use policy::AuthFailurePolicy;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use arc_swap::ArcSwap;
use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::backends::TranslationBackend;
use crate::cache::{CacheStats, TranslationCache};
use crate::error::{BackendError, Error};
use crate::error_code::FailureClass;
use crate::resilience::{CircuitBreaker, SkipWindow};
use crate::types::{BackendStatus, TranslationRequest, TranslationResult};
use crate::Result;
use policy::{decide, Decision};

type Registry = HashMap<String, Arc<dyn TranslationBackend>>;

/// Priority-ordered, caching translation router.
pub struct TranslationRouter {
    backends: RwLock<Registry>,
    config: ArcSwap<RouteConfig>,
    cache: TranslationCache,
    breakers: Mutex<HashMap<String, Arc<CircuitBreaker>>>,
}

impl TranslationRouter {
    pub fn new(config: RouteConfig, cache: TranslationCache) -> Self {
        Self {
            backends: RwLock::new(HashMap::new()),
            config: ArcSwap::from_pointee(config),
            cache,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    pub fn builder() -> TranslationRouterBuilder {
        TranslationRouterBuilder::new()
    }

    /// Translate a request, serving from cache when possible.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let span = info_span!(
            "translate",
            request_id = %Uuid::new_v4(),
            from = request.source_lang(),
            to = request.target_lang(),
        );
        self.route(request).instrument(span).await
    }

    /// Convenience wrapper building the request from its parts.
    pub async fn translate_text(&self, text: &str, from: &str, to: &str) -> Result<TranslationResult> {
        let request = TranslationRequest::new(text, from, to)?;
        self.translate(&request).await
    }

    /// Translate, or hand back `text` unchanged on any failure.
    pub async fn translate_or_source(&self, text: &str, from: &str, to: &str) -> String {
        match self.translate_text(text, from, to).await {
            Ok(result) => result.text,
            Err(e) => {
                warn!(error = %e, "translation unavailable, keeping source text");
                text.to_string()
            }
        }
    }

    async fn route(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let config = self.config.load_full();

        let key = config.cache_enabled.then(|| {
            self.cache
                .key_for(request.text(), request.source_lang(), request.target_lang())
        });

        if let Some(key) = &key {
            match self.cache.get(key).await {
                Ok(Some(stored)) => {
                    debug!(key = %key, provider = %stored.provider, "cache hit");
                    return Ok(stored.into_cache_hit());
                }
                Ok(None) => debug!(key = %key, "cache miss"),
                Err(e) => warn!(key = %key, error = %e, "cache read failed, treating as miss"),
            }
        }

        let candidates = self.candidates(&config);
        debug!(
            sequence = ?candidates.iter().map(|b| b.id()).collect::<Vec<_>>(),
            "route built"
        );

        let mut attempts: Vec<BackendError> = Vec::new();
        for backend in candidates {
            let id = backend.id().to_string();
            let breaker = self.breaker_for(&id, config.skip_window);

            if let Some(breaker) = &breaker {
                if !breaker.allow() {
                    debug!(backend = %id, "inside skip window, not probing");
                    attempts.push(BackendError::new(
                        &id,
                        FailureClass::Unhealthy,
                        "skipped after repeated failures",
                    ));
                    continue;
                }
            }

            if !backend.is_healthy().await {
                warn!(backend = %id, "backend unhealthy, skipping");
                if let Some(breaker) = &breaker {
                    breaker.on_failure();
                }
                attempts.push(BackendError::unhealthy(&id));
                continue;
            }

            match backend.translate(request).await {
                Ok(result) => {
                    if let Some(breaker) = &breaker {
                        breaker.on_success();
                    }
                    if let Some(key) = &key {
                        if let Err(e) = self.cache.put(key, &result, config.cache_ttl()).await {
                            warn!(key = %key, error = %e, "cache write failed");
                        }
                    }
                    info!(
                        backend = %id,
                        failed_before = attempts.len(),
                        "translation served"
                    );
                    return Ok(result);
                }
                Err(err) => {
                    if let Some(breaker) = &breaker {
                        breaker.on_failure();
                    }
                    match decide(err.kind, config.auth_failure_policy) {
                        Decision::Surface => {
                            error!(backend = %id, error = %err, "credentials rejected, stopping route");
                            let message = err.message.clone();
                            attempts.push(err);
                            return Err(Error::Authentication {
                                backend: id,
                                message,
                                attempts,
                            });
                        }
                        Decision::Fallback => {
                            if err.kind == FailureClass::AuthFailure {
                                error!(backend = %id, error = %err, "credentials rejected, trying next backend");
                            } else {
                                warn!(backend = %id, class = %err.kind, error = %err, "backend failed, trying next");
                            }
                            attempts.push(err);
                        }
                    }
                }
            }
        }

        warn!(attempted = attempts.len(), "all backends failed");
        Err(Error::ExhaustedRoute { attempts })
    }

    /// Register a backend, replacing any backend with the same id.
    pub fn add_provider(&self, backend: Arc<dyn TranslationBackend>) {
        let id = backend.id().to_string();
        let replaced = self.write_registry().insert(id.clone(), backend).is_some();
        // A replaced backend starts with a clean failure count.
        self.lock_breakers().remove(&id);
        info!(backend = %id, replaced, "backend registered");
    }

    /// Unregister a backend. Returns whether anything was removed.
    pub fn remove_provider(&self, id: &str) -> bool {
        let removed = self.write_registry().remove(id).is_some();
        if removed {
            self.lock_breakers().remove(id);
            info!(backend = %id, "backend removed");
        }
        removed
    }

    /// Registered backend ids, sorted.
    pub fn provider_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read_registry().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn config(&self) -> RouteConfig {
        RouteConfig::clone(&self.config.load())
    }

    /// Shallow-merge `patch` into the current configuration. Returns the new configuration.
    pub fn update_config(&self, patch: RouteConfigPatch) -> RouteConfig {
        let _previous = self.config.rcu(|current| {
            let mut next = RouteConfig::clone(current);
            next.apply(&patch);
            next
        });
        let updated = self.config();
        debug!(config = ?updated, "route config updated");
        updated
    }

    /// Replace the configuration wholesale.
    pub fn set_config(&self, config: RouteConfig) {
        self.config.store(Arc::new(config));
    }

    /// Backend ids a call would try right now, in order.
    pub fn effective_sequence(&self) -> Vec<String> {
        let config = self.config.load();
        let registry = self.read_registry();
        config
            .sequence()
            .into_iter()
            .filter(|id| registry.contains_key(id))
            .collect()
    }

    /// Health and usage of every registered backend, probed concurrently.
    ///
    /// Backends in the route come first in try order, the rest follow sorted by id.
    pub async fn provider_status(&self) -> Vec<BackendStatus> {
        let backends = self.ordered_backends();
        let checks = backends.into_iter().map(|backend| async move {
            let (healthy, usage) = futures::join!(backend.is_healthy(), backend.usage());
            let id = backend.id().to_string();
            let (usage, last_error) = match usage {
                Ok(usage) => (Some(usage), None),
                Err(e) => {
                    warn!(backend = %id, error = %e, "usage query failed");
                    (None, Some(e.to_string()))
                }
            };
            let skip_remaining_ms = self
                .existing_breaker(&id)
                .and_then(|b| b.snapshot().open_remaining_ms);
            BackendStatus {
                backend: id,
                healthy,
                usage,
                last_error,
                skip_remaining_ms,
                checked_at: Utc::now(),
            }
        });
        join_all(checks).await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    fn candidates(&self, config: &RouteConfig) -> Vec<Arc<dyn TranslationBackend>> {
        let registry = self.read_registry();
        config
            .sequence()
            .iter()
            .filter_map(|id| registry.get(id).cloned())
            .collect()
    }

    fn ordered_backends(&self) -> Vec<Arc<dyn TranslationBackend>> {
        let sequence = self.config.load().sequence();
        let registry = self.read_registry();
        let mut ordered: Vec<Arc<dyn TranslationBackend>> = sequence
            .iter()
            .filter_map(|id| registry.get(id).cloned())
            .collect();
        let mut rest: Vec<&String> = registry
            .keys()
            .filter(|id| !sequence.contains(*id))
            .collect();
        rest.sort();
        ordered.extend(rest.into_iter().filter_map(|id| registry.get(id).cloned()));
        ordered
    }

    /// Breaker for `id` under the current window; rebuilt when the window changes.
    fn breaker_for(&self, id: &str, window: Option<SkipWindow>) -> Option<Arc<CircuitBreaker>> {
        let window = window?;
        let mut breakers = self.lock_breakers();
        match breakers.get(id) {
            Some(existing) if existing.window() == window => Some(Arc::clone(existing)),
            _ => {
                let breaker = Arc::new(CircuitBreaker::new(window));
                breakers.insert(id.to_string(), Arc::clone(&breaker));
                Some(breaker)
            }
        }
    }

    fn existing_breaker(&self, id: &str) -> Option<Arc<CircuitBreaker>> {
        self.config.load().skip_window?;
        self.lock_breakers().get(id).cloned()
    }

    fn read_registry(&self) -> RwLockReadGuard<'_, Registry> {
        self.backends.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, Registry> {
        self.backends.write().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_breakers(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<CircuitBreaker>>> {
        self.breakers.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl std::fmt::Debug for TranslationRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationRouter")
            .field("backends", &self.provider_ids())
            .field("config", &self.config())
            .field("cache", &self.cache.store_name())
            .finish()
    }
}

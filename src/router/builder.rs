use std::sync::Arc;

use tracing::debug;

use super::{RouteConfig, TranslationRouter};
use crate::backends::TranslationBackend;
use crate::cache::{
    CacheKeyGenerator, CacheStore, MemoryStore, TranslationCache, DEFAULT_MAX_ENTRIES,
    DEFAULT_NAMESPACE,
};
use crate::config::RouterSettings;
use crate::resilience::SkipWindow;
use crate::Result;

/// Builder for assembling a router from parts or from [`RouterSettings`].
///
/// Without an explicit store the router gets an in-process LRU of
/// `TRANSLATE_CACHE_MAX_ENTRIES` entries (default [`DEFAULT_MAX_ENTRIES`]).
pub struct TranslationRouterBuilder {
    config: RouteConfig,
    store: Option<Arc<dyn CacheStore>>,
    max_entries: Option<usize>,
    namespace: String,
    backends: Vec<Arc<dyn TranslationBackend>>,
}

impl TranslationRouterBuilder {
    pub fn new() -> Self {
        Self {
            config: RouteConfig::default(),
            store: None,
            max_entries: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            backends: Vec::new(),
        }
    }

    pub fn route(mut self, config: RouteConfig) -> Self {
        self.config = config;
        self
    }

    pub fn primary(mut self, id: impl Into<String>) -> Self {
        self.config.primary = id.into();
        self
    }

    pub fn fallback<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.fallback = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn skip_window(mut self, window: SkipWindow) -> Self {
        self.config.skip_window = Some(window);
        self
    }

    /// Use an external cache store instead of the in-process LRU.
    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn max_cache_entries(mut self, n: usize) -> Self {
        self.max_entries = Some(n);
        self
    }

    pub fn cache_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn backend(mut self, backend: Arc<dyn TranslationBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Take route, cache and backend settings. Backends without credentials are skipped.
    pub fn settings(mut self, settings: RouterSettings) -> Result<Self> {
        settings.validate()?;
        for backend in &settings.backends {
            if let Some(built) = backend.build()? {
                self.backends.push(built);
            }
        }
        self.config = settings.route;
        self.max_entries = Some(settings.cache.max_entries);
        self.namespace = settings.cache.namespace;
        Ok(self)
    }

    pub fn build(self) -> TranslationRouter {
        let store: Arc<dyn CacheStore> = match self.store {
            Some(store) => store,
            None => {
                let max_entries = self
                    .max_entries
                    .or_else(|| {
                        std::env::var("TRANSLATE_CACHE_MAX_ENTRIES")
                            .ok()?
                            .parse::<usize>()
                            .ok()
                    })
                    .unwrap_or(DEFAULT_MAX_ENTRIES);
                Arc::new(MemoryStore::new(max_entries))
            }
        };
        let cache = TranslationCache::new(store)
            .with_key_generator(CacheKeyGenerator::new().with_namespace(self.namespace));

        let router = TranslationRouter::new(self.config, cache);
        for backend in self.backends {
            router.add_provider(backend);
        }
        debug!(
            backends = ?router.provider_ids(),
            sequence = ?router.effective_sequence(),
            "router built"
        );
        router
    }
}

impl Default for TranslationRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! 配置加载：从 YAML 读取路由、缓存与后端设置并构建路由器。
//!
//! Router settings.
//!
//! ```yaml
//! route:
//!   primary: deepl-a
//!   fallback: [deepl-b, google]
//!   cache_ttl_secs: 86400
//! cache:
//!   max_entries: 10000
//! backends:
//!   - { id: deepl-a, kind: deepl, api_key_env: DEEPL_KEY_A }
//!   - { id: google, kind: google, daily_quota: 500000 }
//! ```
//!
//! Environment overrides:
//! - `TRANSLATE_ROUTER_CONFIG`: settings file read by [`RouterSettings::from_env`]
//! - `TRANSLATE_CACHE_TTL_SECS`: replaces `route.cache_ttl_secs`

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::backends::{BackendKind, DeepLBackend, GoogleBackend, TranslationBackend};
use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_NAMESPACE};
use crate::error::{Error, ErrorContext};
use crate::router::{RouteConfig, TranslationRouter};
use crate::transport::HttpTransport;
use crate::usage::{CharacterPricing, SystemClock, UsageTracker};
use crate::Result;

pub const CONFIG_PATH_ENV: &str = "TRANSLATE_ROUTER_CONFIG";
pub const CACHE_TTL_ENV: &str = "TRANSLATE_CACHE_TTL_SECS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    pub route: RouteConfig,
    pub cache: CacheSettings,
    pub backends: Vec<BackendSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Capacity of the in-process LRU store.
    pub max_entries: usize,
    pub namespace: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// One backend instance. The same `kind` may appear several times under different ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    pub id: String,
    pub kind: BackendKind,
    /// Inline key. Prefer `api_key_env` or the OS keyring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Name of the environment variable holding the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Characters per day, used for the local quota estimate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_quota: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Overrides the vendor's list price for cost estimates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_million: Option<f64>,
}

impl RouterSettings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut settings: RouterSettings = serde_yaml::from_str(yaml)?;
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read settings file: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("settings_loader"),
            )
        })?;
        debug!(path = %path.display(), "loading router settings");
        Self::from_yaml_str(&content)
    }

    /// Settings from `TRANSLATE_ROUTER_CONFIG`, or `None` when the variable is unset.
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::from_path(path).map(Some),
            _ => Ok(None),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(ttl) = std::env::var(CACHE_TTL_ENV)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.route.cache_ttl_secs = ttl;
        }
    }

    /// Structural checks only. Route ids naming unknown backends are legal and skipped at routing time.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (i, backend) in self.backends.iter().enumerate() {
            let field = |name: &str| format!("backends[{}].{}", i, name);

            if backend.id.trim().is_empty() {
                return Err(Error::configuration_with_context(
                    "backend id must not be empty",
                    ErrorContext::new()
                        .with_field_path(field("id"))
                        .with_source("settings_validator"),
                ));
            }
            if !seen.insert(backend.id.as_str()) {
                return Err(Error::configuration_with_context(
                    format!("duplicate backend id '{}'", backend.id),
                    ErrorContext::new()
                        .with_field_path(field("id"))
                        .with_source("settings_validator"),
                ));
            }
            if let Some(endpoint) = &backend.endpoint {
                let valid = Url::parse(endpoint)
                    .map(|u| matches!(u.scheme(), "http" | "https"))
                    .unwrap_or(false);
                if !valid {
                    return Err(Error::configuration_with_context(
                        "endpoint must be an http(s) URL",
                        ErrorContext::new()
                            .with_field_path(field("endpoint"))
                            .with_details(endpoint.clone())
                            .with_source("settings_validator"),
                    ));
                }
            }
        }
        if self.cache.max_entries == 0 && self.route.cache_enabled {
            warn!("cache.max_entries is 0, results will not be retained");
        }
        Ok(())
    }

    pub fn into_router(self) -> Result<TranslationRouter> {
        Ok(TranslationRouter::builder().settings(self)?.build())
    }
}

impl BackendSettings {
    /// Explicit key, then `api_key_env`, then keyring / `<ID>_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return Some(key.to_string());
        }
        if let Some(var) = &self.api_key_env {
            if let Ok(key) = std::env::var(var) {
                if !key.is_empty() {
                    return Some(key);
                }
            }
        }
        HttpTransport::resolve_api_key(&self.id, None)
    }

    /// Instantiate the adapter. `Ok(None)` when no credentials are available.
    pub fn build(&self) -> Result<Option<Arc<dyn TranslationBackend>>> {
        let Some(api_key) = self.resolve_api_key() else {
            warn!(backend = %self.id, "no API key configured, backend not registered");
            return Ok(None);
        };

        let backend: Arc<dyn TranslationBackend> = match self.kind {
            BackendKind::DeepL => {
                let mut backend = DeepLBackend::new(&self.id, api_key)?
                    .with_usage_tracker(self.tracker(CharacterPricing::deepl_pro()));
                if let Some(transport) = self.transport_override(backend.endpoint())? {
                    backend = backend.with_transport(transport);
                }
                Arc::new(backend)
            }
            BackendKind::Google => {
                let mut backend = GoogleBackend::new(&self.id, api_key)?
                    .with_usage_tracker(self.tracker(CharacterPricing::google_v2()));
                if let Some(transport) = self.transport_override(backend.endpoint())? {
                    backend = backend.with_transport(transport);
                }
                Arc::new(backend)
            }
        };
        debug!(backend = %self.id, kind = %self.kind, "backend built");
        Ok(Some(backend))
    }

    /// A dedicated transport when the endpoint or timeout differs from the adapter default.
    fn transport_override(&self, default_base: &str) -> Result<Option<HttpTransport>> {
        let base = self.endpoint.as_deref().unwrap_or(default_base);
        match self.timeout_secs {
            Some(secs) => HttpTransport::with_timeout(base, Duration::from_secs(secs)).map(Some),
            None if self.endpoint.is_some() => HttpTransport::new(base).map(Some),
            None => Ok(None),
        }
    }

    fn tracker(&self, default_pricing: CharacterPricing) -> UsageTracker {
        let pricing = match self.price_per_million {
            Some(price) => CharacterPricing::new(price).with_currency(&default_pricing.currency),
            None => default_pricing,
        };
        let mut tracker = UsageTracker::new(Arc::new(SystemClock)).with_pricing(pricing);
        if let Some(limit) = self.daily_quota {
            tracker = tracker.with_daily_limit(limit);
        }
        tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let yaml = r#"
route:
  primary: deepl-a
  fallback: [deepl-b, google]
  cache_enabled: true
cache:
  max_entries: 500
backends:
  - { id: deepl-a, kind: deepl, api_key: "k1:fx" }
  - { id: google, kind: google, api_key: g, daily_quota: 500000, endpoint: "https://translation.googleapis.com" }
"#;
        let settings: RouterSettings = serde_yaml::from_str(yaml).unwrap();
        settings.validate().unwrap();
        assert_eq!(settings.route.primary, "deepl-a");
        assert_eq!(settings.cache.max_entries, 500);
        assert_eq!(settings.cache.namespace, "translation");
        assert_eq!(settings.backends.len(), 2);
        assert_eq!(settings.backends[1].kind, BackendKind::Google);
        assert_eq!(settings.backends[1].daily_quota, Some(500_000));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = r#"
backends:
  - { id: a, kind: deepl, api_key: x }
  - { id: a, kind: google, api_key: y }
"#;
        let settings: RouterSettings = serde_yaml::from_str(yaml).unwrap();
        let err = settings.validate().unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("backends[1].id")
        );
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let settings = RouterSettings {
            backends: vec![BackendSettings {
                id: "g".into(),
                kind: BackendKind::Google,
                api_key: Some("k".into()),
                api_key_env: None,
                endpoint: Some("ftp://example.com".into()),
                daily_quota: None,
                timeout_secs: None,
                price_per_million: None,
            }],
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_unknown_kind_is_a_parse_error() {
        let result = serde_yaml::from_str::<RouterSettings>(
            "backends:\n  - { id: x, kind: babelfish }\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_build_uses_configured_endpoint() {
        let backend = BackendSettings {
            id: "google".into(),
            kind: BackendKind::Google,
            api_key: Some("k".into()),
            api_key_env: None,
            endpoint: Some("http://127.0.0.1:9".into()),
            daily_quota: Some(10),
            timeout_secs: Some(1),
            price_per_million: None,
        }
        .build()
        .unwrap()
        .unwrap();
        assert_eq!(backend.id(), "google");
        assert_eq!(backend.kind(), BackendKind::Google);
    }
}

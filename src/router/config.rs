//! Route configuration and partial updates.

use super::policy::AuthFailurePolicy;
use crate::resilience::SkipWindow;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Backend priority and caching policy for a router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Backend tried first.
    pub primary: String,
    /// Backends tried after the primary, in order.
    pub fallback: Vec<String>,
    /// Advisory only: the router retries across backends, never within one.
    pub max_retries: u32,
    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    pub auth_failure_policy: AuthFailurePolicy,
    /// Skip repeatedly failing backends without probing. Off unless set.
    pub skip_window: Option<SkipWindow>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            primary: String::new(),
            fallback: Vec::new(),
            max_retries: 3,
            cache_enabled: true,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            auth_failure_policy: AuthFailurePolicy::default(),
            skip_window: None,
        }
    }
}

impl RouteConfig {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            ..Self::default()
        }
    }

    pub fn with_fallback<I, S>(mut self, fallback: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback = fallback.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cache(mut self, enabled: bool, ttl_secs: u64) -> Self {
        self.cache_enabled = enabled;
        self.cache_ttl_secs = ttl_secs;
        self
    }

    pub fn with_auth_failure_policy(mut self, policy: AuthFailurePolicy) -> Self {
        self.auth_failure_policy = policy;
        self
    }

    pub fn with_skip_window(mut self, window: SkipWindow) -> Self {
        self.skip_window = Some(window);
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// `[primary] + fallback`, empty ids dropped, first occurrence wins.
    pub fn sequence(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::with_capacity(1 + self.fallback.len());
        for id in std::iter::once(&self.primary).chain(self.fallback.iter()) {
            let id = id.trim();
            if !id.is_empty() && !seen.iter().any(|s| s == id) {
                seen.push(id.to_string());
            }
        }
        seen
    }

    /// Shallow merge: every field present in the patch replaces the current one.
    pub fn apply(&mut self, patch: &RouteConfigPatch) {
        if let Some(primary) = &patch.primary {
            self.primary = primary.clone();
        }
        if let Some(fallback) = &patch.fallback {
            self.fallback = fallback.clone();
        }
        if let Some(max_retries) = patch.max_retries {
            self.max_retries = max_retries;
        }
        if let Some(cache_enabled) = patch.cache_enabled {
            self.cache_enabled = cache_enabled;
        }
        if let Some(ttl) = patch.cache_ttl_secs {
            self.cache_ttl_secs = ttl;
        }
        if let Some(policy) = patch.auth_failure_policy {
            self.auth_failure_policy = policy;
        }
        if let Some(window) = patch.skip_window {
            self.skip_window = window;
        }
    }
}

/// Partial [`RouteConfig`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfigPatch {
    pub primary: Option<String>,
    pub fallback: Option<Vec<String>>,
    pub max_retries: Option<u32>,
    pub cache_enabled: Option<bool>,
    pub cache_ttl_secs: Option<u64>,
    pub auth_failure_policy: Option<AuthFailurePolicy>,
    /// `Some(None)` turns the skip window off.
    pub skip_window: Option<Option<SkipWindow>>,
}

impl RouteConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn primary(mut self, id: impl Into<String>) -> Self {
        self.primary = Some(id.into());
        self
    }
    pub fn fallback<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback = Some(ids.into_iter().map(Into::into).collect());
        self
    }
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = Some(enabled);
        self
    }
    pub fn cache_ttl_secs(mut self, ttl: u64) -> Self {
        self.cache_ttl_secs = Some(ttl);
        self
    }
    pub fn auth_failure_policy(mut self, policy: AuthFailurePolicy) -> Self {
        self.auth_failure_policy = Some(policy);
        self
    }
    pub fn skip_window(mut self, window: Option<SkipWindow>) -> Self {
        self.skip_window = Some(window);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_dedups_and_keeps_order() {
        let cfg = RouteConfig::new("a").with_fallback(["b", "a", "c", "b", ""]);
        assert_eq!(cfg.sequence(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sequence_without_primary() {
        let cfg = RouteConfig::default().with_fallback(["x"]);
        assert_eq!(cfg.sequence(), vec!["x"]);
    }

    #[test]
    fn test_patch_changes_only_given_fields() {
        let mut cfg = RouteConfig::new("a")
            .with_fallback(["b"])
            .with_cache(false, 60);
        let before = cfg.clone();
        cfg.apply(&RouteConfigPatch::new().max_retries(5));

        assert_eq!(cfg.max_retries, 5);
        assert_eq!(cfg.primary, before.primary);
        assert_eq!(cfg.fallback, before.fallback);
        assert_eq!(cfg.cache_enabled, before.cache_enabled);
        assert_eq!(cfg.cache_ttl_secs, before.cache_ttl_secs);
    }

    #[test]
    fn test_patch_can_clear_skip_window() {
        let mut cfg = RouteConfig::new("a").with_skip_window(SkipWindow::default());
        cfg.apply(&RouteConfigPatch::new().skip_window(None));
        assert!(cfg.skip_window.is_none());
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let cfg: RouteConfig =
            serde_yaml::from_str("primary: deepl-a\nfallback: [google]\ncache_ttl_secs: 60\n")
                .unwrap();
        assert_eq!(cfg.sequence(), vec!["deepl-a", "google"]);
        assert!(cfg.cache_enabled);
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(60));
    }
}

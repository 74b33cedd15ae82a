use crate::Result;
use keyring::Entry;
use reqwest::{Proxy, RequestBuilder};
use std::env;
use std::time::Duration;
use url::Url;

/// Keyring service name under which backend API keys may be stored.
pub const KEYRING_SERVICE: &str = "translation-router";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A configured `reqwest` client bound to one vendor base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Client with env-overridable defaults (`TRANSLATE_HTTP_TIMEOUT_SECS`, default 10).
    pub fn new(base_url: &str) -> Result<Self> {
        let timeout_secs = env::var("TRANSLATE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self::with_timeout(base_url, Duration::from_secs(timeout_secs))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                base_url,
                parsed.scheme()
            ))
            .into());
        }

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .pool_max_idle_per_host(
                env::var("TRANSLATE_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("TRANSLATE_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a backend API key: explicit value, then OS keyring, then `<ID>_API_KEY`.
    pub fn resolve_api_key(backend_id: &str, explicit: Option<&str>) -> Option<String> {
        if let Some(key) = explicit.filter(|k| !k.is_empty()) {
            return Some(key.to_string());
        }

        if let Ok(entry) = Entry::new(KEYRING_SERVICE, backend_id) {
            if let Ok(key) = entry.get_password() {
                return Some(key);
            }
        }

        env::var(api_key_env_var(backend_id))
            .ok()
            .filter(|k| !k.is_empty())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }
}

/// `deepl-a` -> `DEEPL_A_API_KEY`
pub(crate) fn api_key_env_var(backend_id: &str) -> String {
    let normalized: String = backend_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("{}_API_KEY", normalized)
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Other(String),
}

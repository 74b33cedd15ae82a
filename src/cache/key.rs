//! Cache key generation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const DEFAULT_NAMESPACE: &str = "translation";

/// Number of digest bytes kept in a key (128 bits).
const DIGEST_BYTES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Derives `"<namespace>:" + hex(digest(text + ":" + from + ":" + to))`.
#[derive(Debug, Clone)]
pub struct CacheKeyGenerator {
    namespace: String,
}

impl CacheKeyGenerator {
    pub fn new() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn generate(&self, text: &str, from: &str, to: &str) -> CacheKey {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update(b":");
        hasher.update(from.as_bytes());
        hasher.update(b":");
        hasher.update(to.as_bytes());
        let digest = hasher.finalize();
        let hash: String = digest[..DIGEST_BYTES]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        CacheKey(format!("{}:{}", self.namespace, hash))
    }
}

impl Default for CacheKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Key in the default `translation` namespace.
pub fn cache_key(text: &str, from: &str, to: &str) -> CacheKey {
    CacheKeyGenerator::new().generate(text, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = cache_key("Hallo", "de", "zh");
        let (ns, hash) = key.as_str().split_once(':').unwrap();
        assert_eq!(ns, "translation");
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_known_digest_is_stable() {
        // sha256("abc:en:de") truncated to 16 bytes; pins the key across releases.
        let mut hasher = Sha256::new();
        hasher.update(b"abc:en:de");
        let expected: String = hasher.finalize()[..16]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        assert_eq!(
            cache_key("abc", "en", "de").as_str(),
            format!("translation:{}", expected)
        );
    }

    #[test]
    fn test_language_pair_changes_key() {
        assert_ne!(cache_key("Hallo", "de", "zh"), cache_key("Hallo", "de", "en"));
        assert_ne!(cache_key("Hallo", "de", "zh"), cache_key("Hallo", "nl", "zh"));
        assert_ne!(cache_key("Hallo", "de", "zh"), cache_key("hallo", "de", "zh"));
    }

    #[test]
    fn test_custom_namespace() {
        let key = CacheKeyGenerator::new()
            .with_namespace("deals:i18n")
            .generate("x", "en", "fr");
        assert!(key.as_str().starts_with("deals:i18n:"));
    }
}

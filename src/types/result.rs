//! Translation result type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finished translation.
///
/// Results are values: the router never edits one in place, it returns a copy with
/// `cache_hit` set when serving from cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
    /// Identifier of the backend that produced the translation.
    pub provider: String,
    /// Backend-reported confidence in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_source: Option<String>,
    #[serde(default)]
    pub cache_hit: bool,
    pub produced_at: DateTime<Utc>,
}

impl TranslationResult {
    pub fn new(text: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider: provider.into(),
            confidence: None,
            detected_source: None,
            cache_hit: false,
            produced_at: Utc::now(),
        }
    }

    /// Confidence is clamped into `[0, 1]`.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_detected_source(mut self, lang: impl Into<String>) -> Self {
        self.detected_source = Some(lang.into());
        self
    }

    pub(crate) fn into_cache_hit(mut self) -> Self {
        self.cache_hit = true;
        self
    }

    pub(crate) fn as_cacheable(&self) -> Self {
        let mut stored = self.clone();
        stored.cache_hit = false;
        stored
    }
}

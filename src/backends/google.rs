//! Google Cloud Translation (Basic, v2) backend.
//!
//! Google exposes no usage endpoint for API keys, so usage is always the local
//! tracker's estimate against the configured daily quota.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{probe, send_json, BackendKind, TranslationBackend};
use crate::error::BackendError;
use crate::error_code::FailureClass;
use crate::transport::HttpTransport;
use crate::types::{BackendUsage, TranslationRequest, TranslationResult};
use crate::usage::{CharacterPricing, SystemClock, UsageTracker};
use crate::Result;

pub const GOOGLE_TRANSLATE_URL: &str = "https://translation.googleapis.com";

const TRANSLATE_PATH: &str = "/language/translate/v2";
const LANGUAGES_PATH: &str = "/language/translate/v2/languages";

#[derive(Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

pub struct GoogleBackend {
    id: String,
    api_key: String,
    transport: HttpTransport,
    usage: UsageTracker,
}

impl GoogleBackend {
    pub fn new(id: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(id, api_key, GOOGLE_TRANSLATE_URL)
    }

    pub fn with_endpoint(
        id: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: &str,
    ) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            api_key: api_key.into(),
            transport: HttpTransport::new(endpoint)?,
            usage: UsageTracker::new(Arc::new(SystemClock))
                .with_pricing(CharacterPricing::google_v2()),
        })
    }

    pub fn with_transport(mut self, transport: HttpTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_usage_tracker(mut self, tracker: UsageTracker) -> Self {
        self.usage = tracker;
        self
    }

    pub fn usage_tracker(&self) -> &UsageTracker {
        &self.usage
    }

    pub fn endpoint(&self) -> &str {
        self.transport.base_url()
    }
}

/// Google reports quota exhaustion as 403 with a `reason` in the error body.
fn refine(_status: u16, body: &str) -> Option<FailureClass> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    envelope
        .error
        .errors
        .iter()
        .filter_map(|e| e.reason.as_deref())
        .find_map(FailureClass::from_vendor_reason)
}

impl std::fmt::Debug for GoogleBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleBackend")
            .field("id", &self.id)
            .field("endpoint", &self.transport.base_url())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TranslationBackend for GoogleBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Google
    }

    async fn is_healthy(&self) -> bool {
        probe(
            self.transport
                .get(LANGUAGES_PATH)
                .header("X-Goog-Api-Key", &self.api_key),
        )
        .await
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> std::result::Result<TranslationResult, BackendError> {
        let source = Some(request.source_lang()).filter(|s| !s.eq_ignore_ascii_case("auto"));
        let body = TranslateBody {
            q: request.text(),
            source,
            target: request.target_lang(),
            format: "text",
        };

        let response: TranslateResponse = send_json(
            &self.id,
            self.transport
                .post(TRANSLATE_PATH)
                .header("X-Goog-Api-Key", &self.api_key)
                .json(&body),
            refine,
        )
        .await?;

        let translation = response.data.translations.into_iter().next().ok_or_else(|| {
            BackendError::new(&self.id, FailureClass::Unknown, "empty translations array")
        })?;

        self.usage.record(request.char_count() as u64);
        debug!(backend = %self.id, chars = request.char_count(), "google translation ok");

        let mut result = TranslationResult::new(translation.translated_text, &self.id);
        if let Some(detected) = translation.detected_source_language {
            result = result.with_detected_source(detected);
        }
        Ok(result)
    }

    async fn usage(&self) -> std::result::Result<BackendUsage, BackendError> {
        Ok(self.usage.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refine_reads_reason() {
        let body = r#"{"error":{"code":403,"message":"Daily Limit Exceeded","errors":[{"message":"Daily Limit Exceeded","domain":"usageLimits","reason":"dailyLimitExceeded"}]}}"#;
        assert_eq!(refine(403, body), Some(FailureClass::QuotaExceeded));

        let body = r#"{"error":{"code":400,"message":"API key not valid.","errors":[{"reason":"keyInvalid"}]}}"#;
        assert_eq!(refine(400, body), Some(FailureClass::AuthFailure));
    }

    #[test]
    fn test_refine_ignores_unknown_bodies() {
        assert_eq!(refine(500, "<html>oops</html>"), None);
        assert_eq!(refine(403, r#"{"error":{"errors":[]}}"#), None);
    }

    #[test]
    fn test_request_body_shape() {
        let body = TranslateBody {
            q: "Hallo",
            source: Some("de"),
            target: "zh",
            format: "text",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"q": "Hallo", "source": "de", "target": "zh", "format": "text"})
        );
    }
}

//! DeepL API v2 backend.
//!
//! Authenticates with `Authorization: DeepL-Auth-Key <key>`. Health is probed via
//! `GET /v2/languages`; live quota comes from `GET /v2/usage`. Free-tier keys
//! (suffix `:fx`) default to the free API host.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{probe, send_json, BackendKind, TranslationBackend};
use crate::error::BackendError;
use crate::error_code::FailureClass;
use crate::transport::HttpTransport;
use crate::types::{BackendUsage, TranslationRequest, TranslationResult, UsageSource};
use crate::usage::{CharacterPricing, SystemClock, UsageTracker};
use crate::Result;

pub const DEEPL_FREE_URL: &str = "https://api-free.deepl.com";
pub const DEEPL_PRO_URL: &str = "https://api.deepl.com";

#[derive(Serialize)]
struct TranslateBody<'a> {
    text: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

#[derive(Deserialize)]
struct UsageResponse {
    character_count: u64,
    character_limit: u64,
}

pub struct DeepLBackend {
    id: String,
    api_key: String,
    transport: HttpTransport,
    usage: UsageTracker,
}

impl DeepLBackend {
    /// Backend on the DeepL host matching the key's tier.
    pub fn new(id: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let endpoint = if api_key.ends_with(":fx") {
            DEEPL_FREE_URL
        } else {
            DEEPL_PRO_URL
        };
        Self::with_endpoint(id, api_key, endpoint)
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
                .with_pricing(CharacterPricing::deepl_pro()),
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

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }
}

/// DeepL reports an exhausted character quota as 456.
fn refine(status: u16, _body: &str) -> Option<FailureClass> {
    match status {
        456 => Some(FailureClass::QuotaExceeded),
        _ => None,
    }
}

fn source_lang(code: &str) -> Option<String> {
    if code.eq_ignore_ascii_case("auto") {
        None
    } else {
        Some(code.to_ascii_uppercase())
    }
}

impl std::fmt::Debug for DeepLBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLBackend")
            .field("id", &self.id)
            .field("endpoint", &self.transport.base_url())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TranslationBackend for DeepLBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> BackendKind {
        BackendKind::DeepL
    }

    async fn is_healthy(&self) -> bool {
        probe(
            self.transport
                .get("/v2/languages")
                .query(&[("type", "target")])
                .header("Authorization", self.auth_header()),
        )
        .await
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> std::result::Result<TranslationResult, BackendError> {
        let body = TranslateBody {
            text: [request.text()],
            source_lang: source_lang(request.source_lang()),
            target_lang: request.target_lang().to_ascii_uppercase(),
            context: request.context(),
        };

        let response: TranslateResponse = send_json(
            &self.id,
            self.transport
                .post("/v2/translate")
                .header("Authorization", self.auth_header())
                .json(&body),
            refine,
        )
        .await?;

        let translation = response.translations.into_iter().next().ok_or_else(|| {
            BackendError::new(&self.id, FailureClass::Unknown, "empty translations array")
        })?;

        self.usage.record(request.char_count() as u64);
        debug!(backend = %self.id, chars = request.char_count(), "deepl translation ok");

        let mut result = TranslationResult::new(translation.text, &self.id);
        if let Some(detected) = translation.detected_source_language {
            result = result.with_detected_source(detected.to_ascii_lowercase());
        }
        Ok(result)
    }

    /// Live billing-period quota merged into the local counters. When `/v2/usage`
    /// cannot be read, the local estimate is returned instead.
    async fn usage(&self) -> std::result::Result<BackendUsage, BackendError> {
        let live: std::result::Result<UsageResponse, BackendError> = send_json(
            &self.id,
            self.transport
                .get("/v2/usage")
                .header("Authorization", self.auth_header()),
            refine,
        )
        .await;

        let mut usage = self.usage.snapshot();
        match live {
            Ok(live) => {
                usage.quota_limit = Some(live.character_limit);
                usage.quota_remaining =
                    Some(live.character_limit.saturating_sub(live.character_count));
                usage.source = UsageSource::Live;
            }
            Err(e) => {
                warn!(backend = %self.id, error = %e, "live usage unavailable, reporting local estimate");
            }
        }
        Ok(usage)
    }
}

//! 翻译后端抽象层：通过 trait 统一多个翻译厂商 API 的健康检查、翻译与用量查询
//!
//! Translation backend abstraction.
//!
//! Every vendor integration implements [`TranslationBackend`] and is registered
//! with the router as `Arc<dyn TranslationBackend>`. Two instances of the same
//! adapter with different ids and keys are independent backends as far as
//! routing and quota are concerned.

pub mod deepl;
pub mod google;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::error_code::FailureClass;
use crate::types::{BackendUsage, TranslationRequest, TranslationResult};

pub use deepl::DeepLBackend;
pub use google::GoogleBackend;

/// Uniform capability contract every translation backend implements.
#[async_trait]
pub trait TranslationBackend: Send + Sync + std::fmt::Debug {
    /// Unique backend identifier used in route configuration.
    fn id(&self) -> &str;

    fn kind(&self) -> BackendKind;

    /// Cheap side-effect-free probe. Never errors; any failure reads as unhealthy.
    async fn is_healthy(&self) -> bool;

    /// Perform the remote translation and record the characters on success.
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, BackendError>;

    /// Best available usage snapshot: live where the vendor exposes it, else local.
    async fn usage(&self) -> Result<BackendUsage, BackendError>;
}

/// Vendor family of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    DeepL,
    Google,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeepL => write!(f, "deepl"),
            Self::Google => write!(f, "google"),
        }
    }
}

static QUOTA_MARKERS: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)quota|limit\s+exceeded|too\s+many\s+requests|character\s+limit").ok()
});

/// True when an error body carries a vendor quota/rate-limit marker.
pub(crate) fn has_quota_marker(body: &str) -> bool {
    QUOTA_MARKERS
        .as_ref()
        .map(|re| re.is_match(body))
        .unwrap_or(false)
}

/// Classify a transport-level failure (no usable HTTP response).
pub(crate) fn transport_failure(backend: &str, err: &reqwest::Error) -> BackendError {
    let kind = if err.is_decode() {
        FailureClass::Unknown
    } else {
        // timeouts, refused connections, TLS and body read errors
        FailureClass::Transient
    };
    let mut error = BackendError::new(backend, kind, err.to_string());
    if let Some(status) = err.status() {
        error = error.with_status(status.as_u16());
    }
    error
}

/// Classify a non-2xx response from its status and body.
///
/// `refine` lets an adapter override the generic status mapping using its own
/// error body format (e.g. Google's `reason` field).
pub(crate) fn response_failure(
    backend: &str,
    status: u16,
    body: &str,
    refine: fn(u16, &str) -> Option<FailureClass>,
) -> BackendError {
    let kind = refine(status, body).unwrap_or_else(|| {
        let by_status = FailureClass::from_http_status(status);
        match by_status {
            FailureClass::AuthFailure | FailureClass::Unknown if has_quota_marker(body) => {
                FailureClass::QuotaExceeded
            }
            other => other,
        }
    });
    let message = if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        body.trim().to_string()
    };
    BackendError::new(backend, kind, message).with_status(status)
}

/// Send a request and decode a JSON body, classifying every failure.
pub(crate) async fn send_json<T: DeserializeOwned>(
    backend: &str,
    request: reqwest::RequestBuilder,
    refine: fn(u16, &str) -> Option<FailureClass>,
) -> Result<T, BackendError> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_failure(backend, &e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(response_failure(backend, status.as_u16(), &body, refine));
    }

    response.json::<T>().await.map_err(|e| {
        BackendError::new(
            backend,
            FailureClass::Unknown,
            format!("undecodable response: {}", e),
        )
        .with_status(status.as_u16())
    })
}

/// Issue a probe request; true only for a 2xx answer.
pub(crate) async fn probe(request: reqwest::RequestBuilder) -> bool {
    match request.send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}

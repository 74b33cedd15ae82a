//! 后端失败分类：定义翻译后端的失败类别及其回退语义。
//!
//! Backend failure classification.
//!
//! Every adapter reports a failed call with one of the classes below. The router
//! picks a per-class policy instead of treating every failure as "try the next one".
//!
//! | Class           | Typical cause                              | Router policy            |
//! |-----------------|--------------------------------------------|--------------------------|
//! | `Unhealthy`     | health probe failed                        | skip, continue           |
//! | `QuotaExceeded` | character / rate limit exhausted           | skip, continue           |
//! | `AuthFailure`   | invalid, revoked or expired API key        | [`AuthFailurePolicy`]    |
//! | `Transient`     | network error, timeout, 5xx                | skip, continue           |
//! | `Unknown`       | anything unclassified                      | skip, continue           |
//!
//! [`AuthFailurePolicy`]: crate::router::AuthFailurePolicy
//!
//! ## Example
//!
//! ```rust
//! use translation_router::error_code::FailureClass;
//!
//! let class = FailureClass::from_http_status(456);
//! assert_eq!(class, FailureClass::QuotaExceeded);
//! assert!(class.fallbackable());
//! assert_eq!(class.name(), "quota_exceeded");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified reason a backend could not serve a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Health probe failed; the backend was never asked to translate.
    Unhealthy,
    /// Character or request quota exhausted for the current period.
    QuotaExceeded,
    /// Credentials rejected by the vendor.
    AuthFailure,
    /// Network error, timeout, or provider-side 5xx.
    Transient,
    /// Could not be classified.
    Unknown,
}

impl FailureClass {
    /// Returns the standard name (e.g. `"quota_exceeded"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unhealthy => "unhealthy",
            Self::QuotaExceeded => "quota_exceeded",
            Self::AuthFailure => "auth_failure",
            Self::Transient => "transient",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the router moves on to the next backend unconditionally.
    ///
    /// `false` only for authentication failures, where the route's
    /// [`AuthFailurePolicy`] decides between failing over and surfacing the error.
    ///
    /// [`AuthFailurePolicy`]: crate::router::AuthFailurePolicy
    #[inline]
    pub fn fallbackable(&self) -> bool {
        !matches!(self, Self::AuthFailure)
    }

    /// Maps an HTTP status code to the most likely class.
    ///
    /// Vendor-specific refinements (e.g. Google reporting quota exhaustion as 403)
    /// are applied by the adapters on top of this.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::AuthFailure,
            // 456 is DeepL's "quota exceeded"
            429 | 456 => Self::QuotaExceeded,
            408 => Self::Transient,
            500..=599 => Self::Transient,
            _ => Self::Unknown,
        }
    }

    /// Maps a vendor error reason string to a class, if it is a known alias.
    pub fn from_vendor_reason(reason: &str) -> Option<Self> {
        let class = match reason {
            "dailyLimitExceeded" | "rateLimitExceeded" | "userRateLimitExceeded"
            | "quotaExceeded" | "quota_exceeded" | "too_many_requests" => Self::QuotaExceeded,
            "keyInvalid" | "keyExpired" | "forbidden" | "unauthorized" | "authError" => {
                Self::AuthFailure
            }
            "backendError" | "internalError" | "timeout" => Self::Transient,
            _ => return None,
        };
        Some(class)
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

//! Per-failure-class routing decisions.

use crate::error_code::FailureClass;
use serde::{Deserialize, Serialize};

/// What the router does when a backend rejects its credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailurePolicy {
    /// Log at error level and keep trying the remaining backends.
    #[default]
    Failover,
    /// Stop routing and return `Error::Authentication` so the misconfiguration is seen.
    Surface,
}

/// Internal decision for how to proceed after a failed backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Fallback,
    Surface,
}

pub(crate) fn decide(class: FailureClass, auth: AuthFailurePolicy) -> Decision {
    if class.fallbackable() {
        return Decision::Fallback;
    }
    match auth {
        AuthFailurePolicy::Failover => Decision::Fallback,
        AuthFailurePolicy::Surface => Decision::Surface,
    }
}

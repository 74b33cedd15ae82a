//! Backend usage and status snapshots.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where a usage figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageSource {
    /// Queried from the vendor's usage endpoint.
    Live,
    /// Counted locally by the adapter's usage tracker.
    Estimated,
}

/// Daily usage snapshot for one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendUsage {
    /// Local calendar day the counters belong to.
    pub date: NaiveDate,
    pub requests_today: u64,
    pub characters_today: u64,
    /// Character quota: per day for locally estimated usage, per vendor billing
    /// period for live usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_remaining: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    pub source: UsageSource,
}

impl BackendUsage {
    /// True when a limit is known and nothing is left.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.quota_remaining, Some(0))
    }
}

/// On-demand health and usage report for one registered backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendStatus {
    pub backend: String,
    pub healthy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<BackendUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Time left before a backend skipped after repeated failures is probed again.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_remaining_ms: Option<u64>,
    pub checked_at: DateTime<Utc>,
}

//! 用量统计模块：按自然日统计每个后端的翻译字符数并估算费用。
//!
//! # Usage Tracking Module
//!
//! Each backend owns one [`UsageTracker`] that counts characters and requests
//! served on the current local calendar day. Counters reset lazily: the first
//! call after the date changes starts the new day from zero.
//!
//! "Today" comes from an injected [`Clock`], so tests can pin the date with
//! [`FixedClock`] while production uses [`SystemClock`].
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Clock`] | Source of the current local date |
//! | [`UsageTracker`] | Atomic per-day character/request counters |
//! | [`CharacterPricing`] | Vendor price per million characters |
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use translation_router::usage::{FixedClock, UsageTracker};
//! use chrono::NaiveDate;
//!
//! let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
//! let tracker = UsageTracker::new(clock.clone()).with_daily_limit(1_000);
//! tracker.record(120);
//! assert_eq!(tracker.snapshot().quota_remaining, Some(880));
//!
//! clock.advance_days(1);
//! assert_eq!(tracker.snapshot().characters_today, 0);
//! ```

mod clock;
mod pricing;
mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use pricing::CharacterPricing;
pub use tracker::UsageTracker;

//! Daily usage counter with lazy date rollover.

use super::{CharacterPricing, Clock};
use crate::types::{BackendUsage, UsageSource};
use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Counts characters and requests for the current local day.
///
/// Counters are atomics updated under the day lock, so a rollover never lands
/// between the character and request increments of one `record`.
#[derive(Debug)]
pub struct UsageTracker {
    clock: Arc<dyn Clock>,
    day: Mutex<NaiveDate>,
    characters: AtomicU64,
    requests: AtomicU64,
    daily_limit: Option<u64>,
    pricing: Option<CharacterPricing>,
}

impl UsageTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let today = clock.today();
        Self {
            clock,
            day: Mutex::new(today),
            characters: AtomicU64::new(0),
            requests: AtomicU64::new(0),
            daily_limit: None,
            pricing: None,
        }
    }

    /// Start from an existing day's counters (e.g. restored state).
    pub fn primed(clock: Arc<dyn Clock>, day: NaiveDate, characters: u64, requests: u64) -> Self {
        Self {
            day: Mutex::new(day),
            characters: AtomicU64::new(characters),
            requests: AtomicU64::new(requests),
            ..Self::new(clock)
        }
    }

    pub fn with_daily_limit(mut self, limit: u64) -> Self {
        self.daily_limit = Some(limit);
        self
    }

    pub fn with_pricing(mut self, pricing: CharacterPricing) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn daily_limit(&self) -> Option<u64> {
        self.daily_limit
    }

    pub fn pricing(&self) -> Option<&CharacterPricing> {
        self.pricing.as_ref()
    }

    /// Record one successful request of `characters` characters.
    pub fn record(&self, characters: u64) {
        let _day = self.current_day();
        self.characters.fetch_add(characters, Ordering::Relaxed);
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn characters_today(&self) -> u64 {
        let _day = self.current_day();
        self.characters.load(Ordering::Relaxed)
    }

    /// Locally tracked snapshot for the current day.
    pub fn snapshot(&self) -> BackendUsage {
        let day = self.current_day();
        let characters_today = self.characters.load(Ordering::Relaxed);
        BackendUsage {
            date: *day,
            requests_today: self.requests.load(Ordering::Relaxed),
            characters_today,
            quota_limit: self.daily_limit,
            quota_remaining: self
                .daily_limit
                .map(|limit| limit.saturating_sub(characters_today)),
            cost: self
                .pricing
                .as_ref()
                .map(|p| p.calculate_cost(characters_today)),
            source: UsageSource::Estimated,
        }
    }

    /// Day lock, held by the caller while it touches the counters. Resets the
    /// counters first when the clock has moved to a new day.
    fn current_day(&self) -> MutexGuard<'_, NaiveDate> {
        let today = self.clock.today();
        let mut day = match self.day.lock() {
            Ok(d) => d,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *day != today {
            *day = today;
            self.characters.store(0, Ordering::Relaxed);
            self.requests.store(0, Ordering::Relaxed);
        }
        day
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::FixedClock;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_accumulates_within_a_day() {
        let clock = Arc::new(FixedClock::new(day(1)));
        let tracker = UsageTracker::new(clock);
        tracker.record(10);
        tracker.record(5);
        let usage = tracker.snapshot();
        assert_eq!(usage.characters_today, 15);
        assert_eq!(usage.requests_today, 2);
        assert_eq!(usage.source, UsageSource::Estimated);
    }

    #[test]
    fn test_primed_yesterday_resets_on_first_call() {
        let clock = Arc::new(FixedClock::new(day(2)));
        let tracker = UsageTracker::primed(clock, day(1), 9_000, 40);
        tracker.record(5);
        let usage = tracker.snapshot();
        assert_eq!(usage.date, day(2));
        assert_eq!(usage.characters_today, 5);
        assert_eq!(usage.requests_today, 1);
    }

    #[test]
    fn test_rollover_when_clock_advances() {
        let clock = Arc::new(FixedClock::new(day(1)));
        let tracker = UsageTracker::new(clock.clone());
        tracker.record(100);
        clock.advance_days(1);
        assert_eq!(tracker.characters_today(), 0);
        tracker.record(7);
        assert_eq!(tracker.characters_today(), 7);
    }

    #[test]
    fn test_remaining_and_cost() {
        let clock = Arc::new(FixedClock::new(day(1)));
        let tracker = UsageTracker::new(clock)
            .with_daily_limit(100)
            .with_pricing(CharacterPricing::new(1_000_000.0));
        tracker.record(150);
        let usage = tracker.snapshot();
        assert_eq!(usage.quota_remaining, Some(0));
        assert!(usage.is_exhausted());
        assert_eq!(usage.cost, Some(150.0));
    }

    #[test]
    fn test_concurrent_records_are_not_lost() {
        let clock = Arc::new(FixedClock::new(day(1)));
        let tracker = Arc::new(UsageTracker::new(clock));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let t = tracker.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        t.record(1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(tracker.characters_today(), 8000);
    }

    #[test]
    fn test_rollover_during_records_keeps_counters_paired() {
        let clock = Arc::new(FixedClock::new(day(1)));
        let tracker = Arc::new(UsageTracker::new(clock.clone()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let t = tracker.clone();
                std::thread::spawn(move || {
                    for _ in 0..5000 {
                        t.record(1);
                    }
                })
            })
            .collect();
        std::thread::sleep(std::time::Duration::from_millis(1));
        clock.advance_days(1);
        for h in handles {
            h.join().unwrap();
        }
        let usage = tracker.snapshot();
        assert_eq!(usage.date, day(2));
        assert_eq!(usage.characters_today, usage.requests_today);
    }
}

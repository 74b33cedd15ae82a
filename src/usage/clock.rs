//! Date sources for daily usage accounting.

use chrono::{Days, Local, NaiveDate};
use std::fmt::Debug;
use std::sync::Mutex;

pub trait Clock: Send + Sync + Debug {
    /// Current local calendar date.
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the process's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock for deterministic tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    date: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Mutex::new(date),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        if let Ok(mut d) = self.date.lock() {
            *d = date;
        }
    }

    pub fn advance_days(&self, days: u64) {
        if let Ok(mut d) = self.date.lock() {
            if let Some(next) = d.checked_add_days(Days::new(days)) {
                *d = next;
            }
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.date.lock() {
            Ok(d) => *d,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

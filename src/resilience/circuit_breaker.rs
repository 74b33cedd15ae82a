use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CircuitBreakerSnapshot {
    pub failure_threshold: u32,
    pub cooldown_ms: u64,
    pub consecutive_failures: u32,
    /// Remaining skip time in ms, if the backend is currently skipped.
    pub open_remaining_ms: Option<u64>,
}

/// How many consecutive failures put a backend into a cooldown, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipWindow {
    pub failure_threshold: u32,
    pub cooldown_secs: u64,
}

impl Default for SkipWindow {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_secs: 60,
        }
    }
}

impl SkipWindow {
    pub fn new(failure_threshold: u32, cooldown_secs: u64) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            cooldown_secs,
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

#[derive(Debug)]
struct State {
    consecutive_failures: u32,
    open_until: Option<Instant>,
}

/// Per-backend failure counter.
///
/// - Counts consecutive failures (unhealthy probes and failed translations)
/// - Opens for the cooldown once the threshold is reached
/// - Any success closes it again
#[derive(Debug)]
pub struct CircuitBreaker {
    window: SkipWindow,
    cooldown: Duration,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(window: SkipWindow) -> Self {
        Self::with_cooldown(window, window.cooldown())
    }

    /// Sub-second cooldowns, mostly for tests.
    pub fn with_cooldown(window: SkipWindow, cooldown: Duration) -> Self {
        Self {
            window,
            cooldown,
            state: Mutex::new(State {
                consecutive_failures: 0,
                open_until: None,
            }),
        }
    }

    pub fn window(&self) -> SkipWindow {
        self.window
    }

    /// Whether the backend may be probed now.
    pub fn allow(&self) -> bool {
        let Ok(mut st) = self.state.lock() else {
            return true;
        };
        if let Some(until) = st.open_until {
            if Instant::now() < until {
                return false;
            }
            // cooldown expired
            st.open_until = None;
            st.consecutive_failures = 0;
        }
        true
    }

    pub fn on_success(&self) {
        if let Ok(mut st) = self.state.lock() {
            st.consecutive_failures = 0;
            st.open_until = None;
        }
    }

    pub fn on_failure(&self) {
        if let Ok(mut st) = self.state.lock() {
            st.consecutive_failures = st.consecutive_failures.saturating_add(1);
            if st.consecutive_failures >= self.window.failure_threshold {
                st.open_until = Some(Instant::now() + self.cooldown);
            }
        }
    }

    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let now = Instant::now();
        let (consecutive_failures, open_remaining_ms) = match self.state.lock() {
            Ok(st) => (
                st.consecutive_failures,
                st.open_until
                    .filter(|until| *until > now)
                    .map(|until| (until - now).as_millis() as u64),
            ),
            Err(_) => (0, None),
        };
        CircuitBreakerSnapshot {
            failure_threshold: self.window.failure_threshold,
            cooldown_ms: self.cooldown.as_millis() as u64,
            consecutive_failures,
            open_remaining_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_skip_window_defaults() {
        let window = SkipWindow::default();
        assert_eq!(window.failure_threshold, 3);
        assert_eq!(window.cooldown(), Duration::from_secs(60));
        assert_eq!(SkipWindow::new(0, 5).failure_threshold, 1);
    }

    #[test]
    fn test_success_resets_failures() {
        let cb = CircuitBreaker::new(SkipWindow::new(5, 30));
        cb.on_failure();
        cb.on_failure();
        assert_eq!(cb.snapshot().consecutive_failures, 2);

        cb.on_success();
        assert_eq!(cb.snapshot().consecutive_failures, 0);
    }

    #[test]
    fn test_opens_at_threshold() {
        let cb = CircuitBreaker::with_cooldown(SkipWindow::new(3, 1), Duration::from_millis(100));

        cb.on_failure();
        cb.on_failure();
        assert!(cb.allow());

        cb.on_failure();
        assert!(!cb.allow());
        assert!(cb.snapshot().open_remaining_ms.is_some());
    }

    #[test]
    fn test_closes_after_cooldown() {
        let cb = CircuitBreaker::with_cooldown(SkipWindow::new(2, 1), Duration::from_millis(50));
        cb.on_failure();
        cb.on_failure();
        assert!(!cb.allow());

        thread::sleep(Duration::from_millis(60));

        assert!(cb.allow());
        assert_eq!(cb.snapshot().consecutive_failures, 0);
    }

    #[test]
    fn test_thread_safe_counting() {
        use std::sync::Arc;

        let cb = Arc::new(CircuitBreaker::new(SkipWindow::new(100, 30)));
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let cb = Arc::clone(&cb);
                thread::spawn(move || {
                    for _ in 0..5 {
                        cb.on_failure();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(cb.snapshot().consecutive_failures, 50);
    }
}

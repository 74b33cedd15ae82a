//! 弹性模块：为持续失败的翻译后端提供可选的“跳过窗口”。
//!
//! # Resilience Primitives
//!
//! By default the router re-probes every backend on every request. When a
//! [`SkipWindow`] is configured, a backend that fails `failure_threshold` times in
//! a row is skipped *without probing* for `cooldown_secs`, after which it is
//! probed again.
//!
//! ```rust
//! use translation_router::resilience::{CircuitBreaker, SkipWindow};
//!
//! let breaker = CircuitBreaker::new(SkipWindow::new(2, 60));
//! breaker.on_failure();
//! assert!(breaker.allow());
//! breaker.on_failure();
//! assert!(!breaker.allow());
//! ```

mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerSnapshot, SkipWindow};

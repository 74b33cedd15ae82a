//! # translation-router
//!
//! 多后端翻译路由库：按优先级在多个翻译服务之间故障转移，统计每个后端的用量，并缓存翻译结果。
//!
//! Multi-backend translation client. A request is served from cache when possible,
//! otherwise it walks an ordered list of interchangeable vendor backends (DeepL,
//! Google, or several independently keyed instances of either) until one succeeds.
//!
//! ## Core Behavior
//!
//! - **Cache first**: results are keyed by content, never by backend
//! - **Priority failover**: `primary` then `fallback`, unhealthy or failing backends skipped
//! - **Classified failures**: every failure fails over by default; rejected credentials
//!   can be configured to stop the route instead
//! - **Usage tracking**: per-backend daily character counters with lazy date rollover
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use translation_router::{DeepLBackend, GoogleBackend, TranslationRouter};
//!
//! #[tokio::main]
//! async fn main() -> translation_router::Result<()> {
//!     let router = TranslationRouter::builder()
//!         .primary("deepl-a")
//!         .fallback(["google"])
//!         .backend(Arc::new(DeepLBackend::new("deepl-a", "key:fx")?))
//!         .backend(Arc::new(GoogleBackend::new("google", "key")?))
//!         .build();
//!
//!     let result = router.translate_text("Hallo", "de", "zh").await?;
//!     println!("{} (via {})", result.text, result.provider);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`router`] | Routing manager, route configuration, auth failure policy |
//! | [`backends`] | Backend contract and the DeepL / Google adapters |
//! | [`cache`] | Cache key generation, store contract, caching policy |
//! | [`usage`] | Daily usage counters, clocks, pricing |
//! | [`resilience`] | Optional skip window for repeatedly failing backends |
//! | [`transport`] | Shared HTTP client and API key resolution |
//! | [`config`] | YAML settings and environment overrides |
//! | [`types`] | Requests, results, usage and status snapshots |
//! | [`error_code`] | Backend failure classification |

pub mod backends;
pub mod cache;
pub mod config;
pub mod error_code;
pub mod resilience;
pub mod router;
pub mod transport;
pub mod types;
pub mod usage;

pub use backends::{BackendKind, DeepLBackend, GoogleBackend, TranslationBackend};
pub use cache::{CacheStore, MemoryStore, TranslationCache};
pub use config::RouterSettings;
pub use error_code::FailureClass;
pub use router::{
    AuthFailurePolicy, RouteConfig, RouteConfigPatch, TranslationRouter, TranslationRouterBuilder,
};
pub use types::{BackendStatus, BackendUsage, Priority, TranslationRequest, TranslationResult};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{BackendError, Error, ErrorContext};

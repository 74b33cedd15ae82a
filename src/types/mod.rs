//! 类型系统模块：定义翻译请求、结果与后端状态的核心数据类型。
//!
//! # Types Module
//!
//! Core data model shared by the router, the backends and the cache.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TranslationRequest`] | Validated, immutable request (text + language pair) |
//! | [`TranslationResult`] | Translation produced by a backend or served from cache |
//! | [`BackendUsage`] | Per-backend daily usage / quota snapshot |
//! | [`BackendStatus`] | Health + usage report for one registered backend |
//!
//! ## Example
//!
//! ```rust
//! use translation_router::types::{Priority, TranslationRequest};
//!
//! let request = TranslationRequest::new("Hallo", "de", "zh")
//!     .unwrap()
//!     .with_priority(Priority::High);
//! assert_eq!(request.char_count(), 5);
//! ```

pub mod request;
pub mod result;
pub mod status;

pub use request::{Priority, TranslationRequest};
pub use result::TranslationResult;
pub use status::{BackendStatus, BackendUsage, UsageSource};

use crate::error_code::FailureClass;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "route.primary", "backends[1].endpoint")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "settings_loader", "request_validator")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A single classified failure reported by one backend.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("backend '{backend}' failed ({kind}): {message}")]
pub struct BackendError {
    /// Identifier of the backend that failed.
    pub backend: String,
    pub kind: FailureClass,
    /// Upstream error text (response body or transport error).
    pub message: String,
    /// HTTP status, when the vendor answered at all.
    pub status: Option<u16>,
}

impl BackendError {
    pub fn new(backend: impl Into<String>, kind: FailureClass, message: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn unhealthy(backend: impl Into<String>) -> Self {
        Self::new(backend, FailureClass::Unhealthy, "health probe failed")
    }
}

/// Unified error type for the translation router.
///
/// Per-backend failures are absorbed by the router; callers only ever see
/// configuration/validation problems, total exhaustion of the route, or (when
/// configured to surface them) rejected credentials.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Cache error: {message}{}", format_context(.context))]
    Cache {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Settings parse error: {0}")]
    Settings(#[from] serde_yaml::Error),

    /// Credentials rejected under `AuthFailurePolicy::Surface`. `attempts` ends with
    /// the auth failure itself.
    #[error("Authentication failed for backend '{backend}': {message}")]
    Authentication {
        backend: String,
        message: String,
        attempts: Vec<BackendError>,
    },

    #[error("{}", format_exhausted(.attempts))]
    ExhaustedRoute { attempts: Vec<BackendError> },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn format_exhausted(attempts: &[BackendError]) -> String {
    match attempts.last() {
        None => "All translation backends failed: no registered backend in route".to_string(),
        Some(last) => format!(
            "All translation backends failed ({} attempted), last: {}: {}",
            attempts.len(),
            last.backend,
            last.message
        ),
    }
}

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new cache error with structured context
    pub fn cache_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Cache {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Validation { context, .. }
            | Error::Cache { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Every backend failure collected before routing stopped, in try order.
    pub fn attempts(&self) -> &[BackendError] {
        match self {
            Error::ExhaustedRoute { attempts } | Error::Authentication { attempts, .. } => attempts,
            _ => &[],
        }
    }

    /// The most recent backend failure, if routing stopped.
    pub fn last_attempt(&self) -> Option<&BackendError> {
        self.attempts().last()
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::ExhaustedRoute { .. })
    }
}

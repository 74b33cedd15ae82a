//! Translation request type.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};

/// Caller-supplied urgency hint. Backends may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// A piece of source-language text to translate.
///
/// Fields are private so a request cannot be altered after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationRequest {
    text: String,
    from: String,
    to: String,
    priority: Option<Priority>,
    context: Option<String>,
}

impl TranslationRequest {
    /// Build a request, rejecting empty text or language codes.
    pub fn new(
        text: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<Self> {
        let text = text.into();
        let from = from.into().trim().to_string();
        let to = to.into().trim().to_string();

        if text.trim().is_empty() {
            return Err(Error::validation_with_context(
                "translation text must not be empty",
                ErrorContext::new()
                    .with_field_path("request.text")
                    .with_source("request_validator"),
            ));
        }
        for (field, value) in [("request.from", &from), ("request.to", &to)] {
            if value.is_empty() {
                return Err(Error::validation_with_context(
                    "language code must not be empty",
                    ErrorContext::new()
                        .with_field_path(field)
                        .with_source("request_validator"),
                ));
            }
        }

        Ok(Self {
            text,
            from,
            to,
            priority: None,
            context: None,
        })
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Free-text context passed to backends that support it (e.g. DeepL `context`).
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_lang(&self) -> &str {
        &self.from
    }

    pub fn target_lang(&self) -> &str {
        &self.to
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Number of Unicode scalar values in the text; this is what vendors bill.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_text() {
        let err = TranslationRequest::new("   ", "de", "en").unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("request.text")
        );
    }

    #[test]
    fn test_rejects_empty_language() {
        let err = TranslationRequest::new("Hallo", "de", " ").unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("request.to")
        );
    }

    #[test]
    fn test_char_count_is_unicode_aware() {
        let req = TranslationRequest::new("日本語", "ja", "en").unwrap();
        assert_eq!(req.char_count(), 3);
        assert_eq!(req.text().len(), 9);
    }

    #[test]
    fn test_optional_fields() {
        let req = TranslationRequest::new("Hallo", "de", "zh")
            .unwrap()
            .with_priority(Priority::Low)
            .with_context("product title");
        assert_eq!(req.priority(), Some(Priority::Low));
        assert_eq!(req.context(), Some("product title"));
    }
}

use serde::Deserialize;

use crate::error::{ApiError, FieldError};

/// Body for creating a post, editing a post, or commenting: just text.
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: Option<String>,
}

impl TextRequest {
    /// Returns the trimmed-nonempty text or the standard validation error.
    pub fn require_text(self) -> Result<String, ApiError> {
        match self.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(ApiError::Validation(vec![FieldError {
                field: "text",
                msg: "Text is required.",
            }])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_accepts_content() {
        let req = TextRequest {
            text: Some("hello".into()),
        };
        assert_eq!(req.require_text().unwrap(), "hello");
    }

    #[test]
    fn require_text_rejects_missing_and_blank() {
        assert!(TextRequest { text: None }.require_text().is_err());
        assert!(TextRequest {
            text: Some("   ".into())
        }
        .require_text()
        .is_err());
    }
}

//! Input normalization for inbound chat requests.

use serde_json::Value;

use crate::error::MAX_INPUT_CHARS;
use crate::{Error, Result};

/// Body keys that may carry the student's text, in lookup order.
pub const TEXT_FIELDS: [&str; 2] = ["text", "userMessage"];

/// Normalized student text, ready for the request assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    text: String,
}

impl ChatRequest {
    /// Extract, trim and validate the text from an inbound JSON body.
    ///
    /// The first of [`TEXT_FIELDS`] holding a string wins. Internal whitespace
    /// runs collapse to a single space and the length limit applies afterwards.
    pub fn from_body(body: &Value) -> Result<Self> {
        let raw = TEXT_FIELDS
            .iter()
            .find_map(|&key| body.get(key).and_then(Value::as_str))
            .ok_or(Error::EmptyInput)?;

        Self::new(raw)
    }

    /// Normalize and validate raw text.
    pub fn new(raw: &str) -> Result<Self> {
        let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");

        if text.is_empty() {
            return Err(Error::EmptyInput);
        }

        let chars = text.chars().count();
        if chars > MAX_INPUT_CHARS {
            return Err(Error::InputTooLarge { chars });
        }

        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collapses_whitespace() {
        let request = ChatRequest::from_body(&json!({"text": "  I feel \n\n  really\ttired  "}))
            .unwrap();
        assert_eq!(request.text(), "I feel really tired");
    }

    #[test]
    fn test_accepts_user_message_key() {
        let request = ChatRequest::from_body(&json!({"userMessage": "hello"})).unwrap();
        assert_eq!(request.text(), "hello");
    }

    #[test]
    fn test_first_string_field_wins() {
        let request =
            ChatRequest::from_body(&json!({"text": 42, "userMessage": "from fallback key"}))
                .unwrap();
        assert_eq!(request.text(), "from fallback key");

        let request =
            ChatRequest::from_body(&json!({"text": "primary", "userMessage": "secondary"}))
                .unwrap();
        assert_eq!(request.text(), "primary");
    }

    #[test]
    fn test_empty_and_missing() {
        assert!(matches!(
            ChatRequest::from_body(&json!({"text": " \t\n "})),
            Err(Error::EmptyInput)
        ));
        assert!(matches!(
            ChatRequest::from_body(&json!({"message": "wrong key"})),
            Err(Error::EmptyInput)
        ));
        assert!(matches!(
            ChatRequest::from_body(&Value::Null),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn test_length_limit_counts_characters_after_normalization() {
        let exact = "é".repeat(MAX_INPUT_CHARS);
        assert_eq!(ChatRequest::new(&exact).unwrap().char_count(), MAX_INPUT_CHARS);

        let padded = format!("   {}   ", "a".repeat(MAX_INPUT_CHARS));
        assert!(ChatRequest::new(&padded).is_ok());

        let over = "a".repeat(MAX_INPUT_CHARS + 1);
        assert!(matches!(
            ChatRequest::new(&over),
            Err(Error::InputTooLarge { chars: 2001 })
        ));
    }
}

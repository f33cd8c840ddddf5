//! API request and response types.

use serde::{Deserialize, Serialize};

/// Request to answer a chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,

    /// Optional conversation id; omitted means a stateless call
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("message must not be empty".to_string());
        }
        Ok(())
    }

    /// Session id, treating blank values as absent.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Chat answer, or a failure description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    /// Final answer, or the error's message on failure
    pub response: String,

    /// Full diagnostic detail; present only when processing failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            error: None,
        }
    }

    pub fn failed(response: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            error: Some(error.into()),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_is_omitted_on_success() {
        let json = serde_json::to_value(ChatResponse::ok("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"response": "hi"}));

        let json = serde_json::to_value(ChatResponse::failed("boom", "boom: detail")).unwrap();
        assert_eq!(json["error"], "boom: detail");
    }

    #[test]
    fn blank_session_is_absent_and_blank_message_invalid() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "  ", "session_id": " "}"#).unwrap();
        assert_eq!(request.session_id(), None);
        assert!(request.validate().is_err());

        let request: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(request.session_id(), None);
        assert!(request.validate().is_ok());
    }
}

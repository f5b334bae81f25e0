//! API Models
//!
//! Request and response bodies for the chat endpoint, annotated with `utoipa`
//! schemas for OpenAPI generation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct ChatRequest {
    /// The user's utterance. Missing or empty input is rejected with 400.
    #[schema(example = "my name is Sam")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct ChatResponse {
    #[schema(example = "Nice to meet you, Sam! How old are you?")]
    pub response: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    #[schema(example = "No message provided")]
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_deserialization() {
        let with_message: ChatRequest = serde_json::from_str(r#"{"message": "hello"}"#).unwrap();
        assert_eq!(with_message.message, Some("hello".to_string()));

        let without_message: ChatRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(without_message.message, None);

        let null_message: ChatRequest = serde_json::from_str(r#"{"message": null}"#).unwrap();
        assert_eq!(null_message.message, None);
    }

    #[test]
    fn test_chat_response_serialization() {
        let response = ChatResponse {
            response: "How are you feeling today?".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"response":"How are you feeling today?"}"#);
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            error: "No message provided".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"error":"No message provided"}"#);
    }
}

//! Reply Generation Backend
//!
//! The engine forwards neutral-tone utterances to an external chat-completion
//! backend behind the `ReplyGenerator` trait. There is exactly one canonical
//! signature: the utterance plus the conversation history. Failures are typed
//! so the engine can substitute its fixed fallback without inspecting them.

use crate::session::{Turn, TurnRole};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

/// Errors from the reply backend. Always recovered by the engine.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("chat backend timed out")]
    Timeout,
    #[error("chat backend request failed: {0}")]
    Backend(String),
}

/// Contract for the external natural-language reply generator.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, utterance: &str, history: &[Turn]) -> Result<String, ReplyError>;
}

/// An implementation of `ReplyGenerator` for any OpenAI-compatible API.
pub struct OpenAIReplyGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIReplyGenerator {
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

fn backend_err(e: impl std::fmt::Display) -> ReplyError {
    ReplyError::Backend(e.to_string())
}

#[async_trait]
impl ReplyGenerator for OpenAIReplyGenerator {
    async fn generate(&self, utterance: &str, history: &[Turn]) -> Result<String, ReplyError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content("You are a helpful, empathetic chatbot.")
                .build()
                .map_err(backend_err)?
                .into(),
        ];
        // System and feedback turns stay local; the backend only sees dialogue.
        for turn in history {
            match turn.role {
                TurnRole::User => messages.push(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(turn.content.clone())
                        .build()
                        .map_err(backend_err)?
                        .into(),
                ),
                TurnRole::Assistant => messages.push(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(turn.content.clone())
                        .build()
                        .map_err(backend_err)?
                        .into(),
                ),
                TurnRole::System | TurnRole::Feedback => {}
            }
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(utterance)
                .build()
                .map_err(backend_err)?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(200u32)
            .temperature(0.7)
            .build()
            .map_err(backend_err)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(backend_err)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| ReplyError::Backend("no content in backend response".to_string()))?;

        Ok(content.trim().to_string())
    }
}

/// A `ReplyGenerator` returning a fixed reply, for development and testing.
pub struct StaticReplyGenerator {
    reply: String,
}

impl StaticReplyGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl ReplyGenerator for StaticReplyGenerator {
    async fn generate(&self, _utterance: &str, _history: &[Turn]) -> Result<String, ReplyError> {
        Ok(self.reply.clone())
    }
}

//! The model backend seam.
//!
//! `ChatClient` is the one trait the agent loop talks to. Transport and
//! backend failures surface as `Err(ProviderError)` here; only the loop
//! decides how a failure reads to the end user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::{ChatMessage, ToolCallRequest};
use crate::tool::ToolDefinition;

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    512
}

/// One chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,

    pub messages: Vec<ChatMessage>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

/// What the backend answered: text, tool calls, or both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
}

/// A chat-completion backend.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Stable identifier for logging ("openai_compat", mocks in tests).
    fn name(&self) -> &str;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_match_runtime_defaults() {
        let req = ChatRequest::new("deepseek/deepseek-chat", vec![ChatMessage::user("hi")]);
        assert_eq!(req.temperature, 0.1);
        assert_eq!(req.max_tokens, 512);
        assert!(req.tools.is_empty());
    }

    #[test]
    fn empty_response_serializes_to_empty_object() {
        let json = serde_json::to_string(&ChatResponse::default()).unwrap();
        assert_eq!(json, "{}");
    }
}

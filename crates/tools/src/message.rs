//! message tool — lets the model push a message to a channel mid-turn.

use std::sync::Arc;

use async_trait::async_trait;
use ferroclaw_core::bus::{MessageBus, OutboundMessage};
use ferroclaw_core::error::ToolError;
use ferroclaw_core::tool::Tool;

pub struct MessageTool {
    bus: Arc<MessageBus>,
    default_channel: String,
    default_chat_id: String,
}

impl MessageTool {
    pub fn new(
        bus: Arc<MessageBus>,
        default_channel: impl Into<String>,
        default_chat_id: impl Into<String>,
    ) -> Self {
        Self {
            bus,
            default_channel: default_channel.into(),
            default_chat_id: default_chat_id.into(),
        }
    }
}

#[async_trait]
impl Tool for MessageTool {
    fn name(&self) -> &str {
        "message"
    }

    fn description(&self) -> &str {
        "Send a message to the user. Use this when you want to communicate something."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The message content to send"
                },
                "channel": {
                    "type": "string",
                    "description": "Optional: target channel"
                },
                "chat_id": {
                    "type": "string",
                    "description": "Optional: target chat/user ID"
                }
            },
            "required": ["content"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'content' must be a string".into()))?;
        let channel = arguments["channel"]
            .as_str()
            .unwrap_or(&self.default_channel);
        let chat_id = arguments["chat_id"]
            .as_str()
            .unwrap_or(&self.default_chat_id);

        self.bus
            .publish_outbound(OutboundMessage::new(channel, chat_id, content));
        Ok(format!("Message sent: {content}"))
    }
}

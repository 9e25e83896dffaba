//! The conversation driver: consumes inbound messages from the bus, runs
//! the bounded tool-calling loop against the model, and publishes replies.

use std::sync::Arc;

use ferroclaw_core::bus::{InboundMessage, MessageBus, OutboundMessage};
use ferroclaw_core::message::ChatMessage;
use ferroclaw_core::provider::{ChatClient, ChatRequest, ChatResponse};
use ferroclaw_core::session::SessionStore;
use ferroclaw_core::tool::ToolRegistry;
use tracing::{debug, error, info, warn};

use crate::context::ContextBuilder;

/// Reply sent when a turn fails at the dispatch boundary.
const APOLOGY_REPLY: &str = "Sorry, something went wrong while processing your message. Please try again.";

/// The agent loop: one driver serves every channel over the shared bus.
pub struct AgentLoop {
    bus: Arc<MessageBus>,
    client: Arc<dyn ChatClient>,
    tools: Arc<ToolRegistry>,
    sessions: Arc<SessionStore>,
    context: ContextBuilder,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_iterations: u32,
}

impl AgentLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bus: Arc<MessageBus>,
        client: Arc<dyn ChatClient>,
        tools: Arc<ToolRegistry>,
        sessions: Arc<SessionStore>,
        context: ContextBuilder,
        model: impl Into<String>,
    ) -> Self {
        Self {
            bus,
            client,
            tools,
            sessions,
            context,
            model: model.into(),
            temperature: 0.1,
            max_tokens: 512,
            max_iterations: 40,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Consume inbound messages forever. A failed turn is answered with an
    /// apology; it never takes the process down.
    pub async fn run(&self) {
        info!(model = %self.model, "agent loop started");
        loop {
            let msg = self.bus.consume_inbound().await;
            debug!(channel = %msg.channel, chat_id = %msg.chat_id, "processing inbound message");

            let reply = match self.process_message(&msg).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!(error = %e, channel = %msg.channel, "turn failed");
                    APOLOGY_REPLY.to_string()
                }
            };

            // Routing metadata (thread ids and the like) travels back with
            // the reply so the adapter can thread it correctly.
            let mut out = OutboundMessage::new(&msg.channel, &msg.chat_id, reply);
            out.metadata = msg.metadata.clone();
            self.bus.publish_outbound(out);
        }
    }

    /// Run one full conversation turn and return the reply text.
    pub async fn process_message(
        &self,
        msg: &InboundMessage,
    ) -> Result<String, ferroclaw_core::Error> {
        let session_key = msg.session_key();
        let mut guard = self.sessions.acquire(&session_key).await;
        let history = guard.clone();

        let mut transcript = self
            .context
            .build_messages(&history, &msg.content, Some(&msg.channel), Some(&msg.chat_id))
            .await;

        let definitions = self.tools.definitions();
        let mut outcome: Option<Option<String>> = None;

        for iteration in 0..self.max_iterations {
            debug!(session_key = %session_key, iteration, "agent loop iteration");

            let request = ChatRequest {
                model: self.model.clone(),
                messages: transcript.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: definitions.clone(),
            };

            // A backend failure still ends the turn in a readable reply.
            let response = match self.client.chat(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, "model call failed");
                    ChatResponse {
                        content: Some(format!("Error calling LLM: {e}")),
                        tool_calls: Vec::new(),
                        reasoning_content: None,
                    }
                }
            };

            if response.tool_calls.is_empty() {
                let mut assistant =
                    ChatMessage::assistant_with_calls(response.content.clone(), Vec::new());
                assistant.reasoning_content = response.reasoning_content;
                transcript.push(assistant);
                outcome = Some(response.content);
                break;
            }

            let mut assistant =
                ChatMessage::assistant_with_calls(response.content.clone(), response.tool_calls.clone());
            assistant.reasoning_content = response.reasoning_content;
            transcript.push(assistant);

            for call in &response.tool_calls {
                let result = match serde_json::from_str::<serde_json::Value>(&call.arguments) {
                    Ok(args) => self.tools.execute(&call.name, &args).await,
                    Err(e) => format!("Error: invalid tool arguments: {e}"),
                };
                transcript.push(ChatMessage::tool_result(&call.id, &call.name, result));
            }
        }

        // The system prompt is rebuilt each turn; persist everything after it.
        self.sessions.commit(&mut guard, transcript[1..].to_vec());
        drop(guard);

        let reply = match outcome {
            Some(Some(content)) if !content.is_empty() => content,
            Some(_) => "No response".to_string(),
            None => {
                warn!(session_key = %session_key, "iteration limit reached");
                format!(
                    "I reached the maximum number of iterations ({}) without completing the task.",
                    self.max_iterations
                )
            }
        };
        Ok(reply)
    }
}

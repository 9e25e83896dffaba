//! CLI channel — the interactive stdin/stdout adapter.

use std::sync::Arc;

use async_trait::async_trait;
use ferroclaw_core::bus::{InboundMessage, MessageBus};
use ferroclaw_core::channel::{sender_allowed, Channel};
use ferroclaw_core::error::ChannelError;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const CHANNEL_NAME: &str = "cli";
const LOCAL_SENDER: &str = "local";
const CHAT_ID: &str = "direct";

/// Reads stdin lines onto the bus and prints replies addressed to "cli".
pub struct CliChannel {
    bus: Arc<MessageBus>,
    allow_from: Vec<String>,
}

impl CliChannel {
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            bus,
            allow_from: Vec::new(),
        }
    }

    pub fn with_allow_from(mut self, allow_from: Vec<String>) -> Self {
        self.allow_from = allow_from;
        self
    }

    fn is_exit(line: &str) -> bool {
        matches!(line.trim(), "exit" | "quit" | "/exit")
    }

    /// Put one stdin line on the bus, subject to the allow-list.
    fn publish_line(&self, line: &str) {
        if !self.is_allowed(LOCAL_SENDER) {
            warn!(sender = LOCAL_SENDER, "sender not on the allow-list; dropping message");
            return;
        }
        debug!(content = %line, "cli inbound");
        self.bus
            .publish_inbound(InboundMessage::new(CHANNEL_NAME, LOCAL_SENDER, CHAT_ID, line));
    }

    /// Print replies addressed to "cli". Outbound messages for channels with
    /// no running adapter have nowhere to go; they are logged and dropped
    /// rather than requeued, which would spin and reorder the queue.
    fn spawn_printer(bus: Arc<MessageBus>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let msg = bus.consume_outbound().await;
                if msg.channel != CHANNEL_NAME {
                    warn!(channel = %msg.channel, chat_id = %msg.chat_id, "no adapter for outbound message; dropping");
                    continue;
                }
                println!("\nferroclaw: {}\n", msg.content);
            }
        })
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        CHANNEL_NAME
    }

    fn is_allowed(&self, sender_id: &str) -> bool {
        // Stdin is inherently local; an empty allow-list admits only that.
        sender_allowed(&self.allow_from, sender_id, LOCAL_SENDER)
    }

    async fn run(&self) -> Result<(), ChannelError> {
        println!("ferroclaw — type your message (exit/quit to leave)");

        // Replies print from a separate task so the prompt never blocks them.
        let printer = Self::spawn_printer(self.bus.clone());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = lines.next_line().await.map_err(|e| ChannelError::Io {
                channel: CHANNEL_NAME.into(),
                reason: e.to_string(),
            })?;
            let Some(line) = line else { break };

            if Self::is_exit(&line) {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            self.publish_line(line.trim());
        }

        printer.abort();
        Ok(())
    }
}

//! The message bus connecting channels to the agent loop.
//!
//! Two independent FIFO queues: inbound (channel → agent) and outbound
//! (agent → channel). Publishing never blocks; consuming suspends until an
//! item arrives. When a consumer is already waiting, a published item is
//! handed to it directly instead of touching the buffer, so a queue holds
//! either buffered items or pending consumers, never both.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// A message arriving from a channel adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Which adapter produced this message ("cli", "telegram", ...)
    pub channel: String,

    /// Platform identity of the sender
    pub sender_id: String,

    /// Conversation identifier within the channel
    pub chat_id: String,

    /// The message text
    pub content: String,

    /// Paths or URLs of attached media
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<String>,

    /// Adapter-specific extras
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Overrides the derived session key when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key_override: Option<String>,
}

impl InboundMessage {
    pub fn new(
        channel: impl Into<String>,
        sender_id: impl Into<String>,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            sender_id: sender_id.into(),
            chat_id: chat_id.into(),
            content: content.into(),
            media: Vec::new(),
            metadata: serde_json::Map::new(),
            session_key_override: None,
        }
    }

    /// The history key this message belongs to: the explicit override when
    /// present, otherwise `"{channel}:{chat_id}"`.
    pub fn session_key(&self) -> String {
        match &self.session_key_override {
            Some(key) => key.clone(),
            None => format!("{}:{}", self.channel, self.chat_id),
        }
    }
}

/// A reply on its way back to a channel adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Which adapter should deliver this
    pub channel: String,

    /// Conversation identifier within the channel
    pub chat_id: String,

    /// The reply text
    pub content: String,

    /// Adapter-specific extras
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl OutboundMessage {
    pub fn new(
        channel: impl Into<String>,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            chat_id: chat_id.into(),
            content: content.into(),
            metadata: serde_json::Map::new(),
        }
    }
}

/// One FIFO queue with direct handoff to suspended consumers.
struct Mailbox<T> {
    state: Mutex<MailboxState<T>>,
}

struct MailboxState<T> {
    buffer: VecDeque<T>,
    waiters: VecDeque<oneshot::Sender<T>>,
}

impl<T> Mailbox<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(MailboxState {
                buffer: VecDeque::new(),
                waiters: VecDeque::new(),
            }),
        }
    }

    fn publish(&self, mut item: T) {
        let mut state = self.state.lock().expect("mailbox lock poisoned");
        // Oldest waiter first; a waiter whose receiver was dropped hands the
        // item back, so delivery falls through to the next one.
        while let Some(waiter) = state.waiters.pop_front() {
            match waiter.send(item) {
                Ok(()) => return,
                Err(returned) => item = returned,
            }
        }
        state.buffer.push_back(item);
    }

    async fn consume(&self) -> T {
        let rx = {
            let mut state = self.state.lock().expect("mailbox lock poisoned");
            if let Some(item) = state.buffer.pop_front() {
                return item;
            }
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            rx
        };
        // The sender is dropped only when the mailbox itself is dropped, and
        // a consumer borrows the mailbox for the duration of the await.
        rx.await.expect("mailbox dropped with consumer pending")
    }

    fn depth(&self) -> usize {
        self.state.lock().expect("mailbox lock poisoned").buffer.len()
    }

    fn pending_consumers(&self) -> usize {
        self.state.lock().expect("mailbox lock poisoned").waiters.len()
    }

    // Buffer only: dropping waiters would sever consumers suspended in
    // `consume`, which hold the other end of those senders.
    fn clear(&self) {
        let mut state = self.state.lock().expect("mailbox lock poisoned");
        state.buffer.clear();
    }
}

/// The shared bus. Cheap to share behind an `Arc`.
pub struct MessageBus {
    inbound: Mailbox<InboundMessage>,
    outbound: Mailbox<OutboundMessage>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            inbound: Mailbox::new(),
            outbound: Mailbox::new(),
        }
    }

    /// Publish a message from a channel adapter. Never blocks.
    pub fn publish_inbound(&self, msg: InboundMessage) {
        tracing::debug!(channel = %msg.channel, chat_id = %msg.chat_id, "inbound message published");
        self.inbound.publish(msg);
    }

    /// Await the next inbound message in FIFO order.
    pub async fn consume_inbound(&self) -> InboundMessage {
        self.inbound.consume().await
    }

    /// Publish a reply toward a channel adapter. Never blocks.
    pub fn publish_outbound(&self, msg: OutboundMessage) {
        tracing::debug!(channel = %msg.channel, chat_id = %msg.chat_id, "outbound message published");
        self.outbound.publish(msg);
    }

    /// Await the next outbound message in FIFO order.
    pub async fn consume_outbound(&self) -> OutboundMessage {
        self.outbound.consume().await
    }

    /// Buffered inbound messages not yet handed to a consumer.
    pub fn inbound_depth(&self) -> usize {
        self.inbound.depth()
    }

    /// Buffered outbound messages not yet handed to a consumer.
    pub fn outbound_depth(&self) -> usize {
        self.outbound.depth()
    }

    /// Consumers currently suspended on the inbound queue.
    pub fn inbound_pending_consumers(&self) -> usize {
        self.inbound.pending_consumers()
    }

    /// Consumers currently suspended on the outbound queue.
    pub fn outbound_pending_consumers(&self) -> usize {
        self.outbound.pending_consumers()
    }

    /// Drop all buffered items. Consumers already suspended keep waiting for
    /// the next publish. Test helper.
    pub fn clear(&self) {
        self.inbound.clear();
        self.outbound.clear();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn session_key_defaults_to_channel_and_chat() {
        let msg = InboundMessage::new("cli", "local", "direct", "hi");
        assert_eq!(msg.session_key(), "cli:direct");
    }

    #[test]
    fn session_key_override_wins() {
        let mut msg = InboundMessage::new("cli", "local", "direct", "hi");
        msg.session_key_override = Some("custom".into());
        assert_eq!(msg.session_key(), "custom");
    }

    #[tokio::test]
    async fn buffered_messages_come_out_in_fifo_order() {
        let bus = MessageBus::new();
        bus.publish_inbound(InboundMessage::new("cli", "a", "c", "first"));
        bus.publish_inbound(InboundMessage::new("cli", "a", "c", "second"));
        assert_eq!(bus.inbound_depth(), 2);

        assert_eq!(bus.consume_inbound().await.content, "first");
        assert_eq!(bus.consume_inbound().await.content, "second");
        assert_eq!(bus.inbound_depth(), 0);
    }

    #[tokio::test]
    async fn publish_hands_off_to_waiting_consumer() {
        let bus = Arc::new(MessageBus::new());

        let consumer = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.consume_inbound().await })
        };
        // Let the consumer suspend before publishing.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(bus.inbound_pending_consumers(), 1);

        bus.publish_inbound(InboundMessage::new("cli", "a", "c", "direct handoff"));
        // Direct handoff: the buffer never grows.
        assert_eq!(bus.inbound_depth(), 0);
        assert_eq!(consumer.await.unwrap().content, "direct handoff");
    }

    #[tokio::test]
    async fn waiting_consumers_resolve_in_arrival_order() {
        let bus = Arc::new(MessageBus::new());

        let first = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.consume_outbound().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.consume_outbound().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(bus.outbound_pending_consumers(), 2);

        bus.publish_outbound(OutboundMessage::new("cli", "c", "for first"));
        bus.publish_outbound(OutboundMessage::new("cli", "c", "for second"));

        assert_eq!(first.await.unwrap().content, "for first");
        assert_eq!(second.await.unwrap().content, "for second");
    }

    #[tokio::test]
    async fn dead_consumer_is_skipped() {
        let bus = Arc::new(MessageBus::new());

        let doomed = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.consume_inbound().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        doomed.abort();
        let _ = doomed.await;

        let live = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.consume_inbound().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        bus.publish_inbound(InboundMessage::new("cli", "a", "c", "survives"));
        assert_eq!(live.await.unwrap().content, "survives");
    }

    #[tokio::test]
    async fn queues_are_independent() {
        let bus = MessageBus::new();
        bus.publish_inbound(InboundMessage::new("cli", "a", "c", "in"));
        bus.publish_outbound(OutboundMessage::new("cli", "c", "out"));

        assert_eq!(bus.inbound_depth(), 1);
        assert_eq!(bus.outbound_depth(), 1);
        assert_eq!(bus.consume_outbound().await.content, "out");
        assert_eq!(bus.consume_inbound().await.content, "in");
    }

    #[tokio::test]
    async fn clear_empties_buffers() {
        let bus = MessageBus::new();
        bus.publish_inbound(InboundMessage::new("cli", "a", "c", "stale"));
        bus.clear();
        assert_eq!(bus.inbound_depth(), 0);
    }

    #[tokio::test]
    async fn clear_leaves_suspended_consumers_waiting() {
        let bus = Arc::new(MessageBus::new());

        let consumer = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.consume_inbound().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(bus.inbound_pending_consumers(), 1);

        bus.clear();
        assert_eq!(bus.inbound_pending_consumers(), 1);

        bus.publish_inbound(InboundMessage::new("cli", "a", "c", "after clear"));
        assert_eq!(consumer.await.unwrap().content, "after clear");
    }
}

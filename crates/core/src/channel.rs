//! The channel adapter seam.
//!
//! A channel owns one side of the bus: it publishes what users say as
//! inbound messages and delivers outbound replies addressed to it.

use async_trait::async_trait;

use crate::error::ChannelError;

/// A platform adapter (CLI, chat platform, webhook, ...).
#[async_trait]
pub trait Channel: Send + Sync {
    /// The `channel` value stamped on every message this adapter produces,
    /// and the filter it applies when consuming outbound messages.
    fn name(&self) -> &str;

    /// Allow-list check. An empty list admits only the adapter's own local
    /// identity; `"*"` admits everyone.
    fn is_allowed(&self, sender_id: &str) -> bool;

    /// Run the adapter until its input source ends.
    async fn run(&self) -> Result<(), ChannelError>;
}

/// Shared allow-list predicate for adapters configured with `allow_from`.
pub fn sender_allowed(allow_from: &[String], sender_id: &str, local_id: &str) -> bool {
    if allow_from.is_empty() {
        return sender_id == local_id;
    }
    allow_from.iter().any(|a| a == "*" || a == sender_id)
}

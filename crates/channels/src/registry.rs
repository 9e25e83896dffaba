//! Channel registry — holds the enabled channel adapters.

use std::collections::HashMap;
use std::sync::Arc;

use ferroclaw_core::channel::Channel;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Central registry holding all enabled channel adapters.
pub struct ChannelRegistry {
    channels: HashMap<String, Arc<dyn Channel>>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }

    /// Register a channel adapter.
    pub fn register(&mut self, channel: Arc<dyn Channel>) {
        let name = channel.name().to_string();
        info!(channel = %name, "Registered channel");
        self.channels.insert(name, channel);
    }

    /// Get a channel by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Channel>> {
        self.channels.get(name)
    }

    /// List all registered channel names.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Spawn every registered adapter's run loop.
    pub fn run_all(&self) -> Vec<JoinHandle<()>> {
        self.channels
            .values()
            .map(|channel| {
                let channel = channel.clone();
                tokio::spawn(async move {
                    let name = channel.name().to_string();
                    info!(channel = %name, "Starting channel");
                    if let Err(e) = channel.run().await {
                        error!(channel = %name, error = %e, "Channel exited with error");
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ferroclaw_core::error::ChannelError;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MockChannel {
        name: String,
        ran: Arc<AtomicBool>,
    }

    impl MockChannel {
        fn new(name: &str) -> Self {
            Self {
                name: name.into(),
                ran: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    #[async_trait]
    impl Channel for MockChannel {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_allowed(&self, _sender_id: &str) -> bool {
            true
        }

        async fn run(&self) -> Result<(), ChannelError> {
            self.ran.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn empty_registry() {
        let reg = ChannelRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn register_and_list() {
        let mut reg = ChannelRegistry::new();
        reg.register(Arc::new(MockChannel::new("cli")));
        reg.register(Arc::new(MockChannel::new("telegram")));

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.list(), vec!["cli", "telegram"]);
        assert!(reg.get("cli").is_some());
        assert!(reg.get("slack").is_none());
    }

    #[tokio::test]
    async fn run_all_starts_every_channel() {
        let mut reg = ChannelRegistry::new();
        let ch = Arc::new(MockChannel::new("cli"));
        let ran = ch.ran.clone();
        reg.register(ch);

        for handle in reg.run_all() {
            handle.await.unwrap();
        }
        assert!(ran.load(Ordering::SeqCst));
    }
}

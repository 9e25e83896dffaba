//! Per-session conversation history.
//!
//! Sessions are keyed by `InboundMessage::session_key()` and live for the
//! process lifetime only. `acquire` hands out an owned per-key lock so
//! overlapping turns on the same session serialize while different sessions
//! stay concurrent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use crate::message::ChatMessage;

/// In-memory history store with a sliding window per session.
pub struct SessionStore {
    memory_window: usize,
    sessions: Mutex<HashMap<String, Arc<tokio::sync::Mutex<Vec<ChatMessage>>>>>,
}

impl SessionStore {
    pub fn new(memory_window: usize) -> Self {
        Self {
            memory_window,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the session for one full turn. The guard derefs to the stored
    /// history; drop it (or `commit` through it) to let the next turn in.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<Vec<ChatMessage>> {
        let entry = {
            let mut sessions = self.sessions.lock().expect("session map lock poisoned");
            sessions
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(Vec::new())))
                .clone()
        };
        entry.lock_owned().await
    }

    /// Replace the locked session's history with the tail of `transcript`
    /// that fits the memory window.
    pub fn commit(&self, guard: &mut OwnedMutexGuard<Vec<ChatMessage>>, transcript: Vec<ChatMessage>) {
        let start = transcript.len().saturating_sub(self.memory_window);
        **guard = transcript[start..].to_vec();
    }

    pub fn window(&self) -> usize {
        self.memory_window
    }

    /// Number of sessions created so far.
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session map lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc as StdArc;
    use std::time::Duration;

    #[tokio::test]
    async fn sessions_are_created_lazily() {
        let store = SessionStore::new(100);
        assert!(store.is_empty());

        let guard = store.acquire("cli:direct").await;
        assert!(guard.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn commit_stores_and_truncates_to_window() {
        let store = SessionStore::new(3);
        let mut guard = store.acquire("cli:direct").await;

        let transcript: Vec<ChatMessage> =
            (0..5).map(|i| ChatMessage::user(format!("msg {i}"))).collect();
        store.commit(&mut guard, transcript);
        drop(guard);

        let guard = store.acquire("cli:direct").await;
        assert_eq!(guard.len(), 3);
        assert_eq!(guard[0].content.as_deref(), Some("msg 2"));
        assert_eq!(guard[2].content.as_deref(), Some("msg 4"));
    }

    #[tokio::test]
    async fn short_transcripts_are_kept_whole() {
        let store = SessionStore::new(100);
        let mut guard = store.acquire("cli:direct").await;
        store.commit(&mut guard, vec![ChatMessage::user("only one")]);
        assert_eq!(guard.len(), 1);
    }

    #[tokio::test]
    async fn same_key_serializes_overlapping_turns() {
        let store = StdArc::new(SessionStore::new(100));

        let guard = store.acquire("cli:direct").await;
        let blocked = {
            let store = store.clone();
            tokio::spawn(async move {
                let _guard = store.acquire("cli:direct").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!blocked.is_finished());

        drop(guard);
        blocked.await.unwrap();
    }

    #[tokio::test]
    async fn different_keys_do_not_block_each_other() {
        let store = SessionStore::new(100);
        let _a = store.acquire("cli:one").await;
        // Would deadlock if keys shared a lock.
        let _b = store.acquire("cli:two").await;
        assert_eq!(store.len(), 2);
    }
}

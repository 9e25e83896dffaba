//! # ferroclaw-core
//!
//! Core domain types and traits for the Ferroclaw agent runtime.
//!
//! This crate defines the vocabulary the rest of the workspace speaks:
//!
//! - [`bus`] — the inbound/outbound message bus between channels and the
//!   agent loop
//! - [`message`] — transcript types ([`ChatMessage`], [`Role`],
//!   [`ToolCallRequest`])
//! - [`session`] — the per-session history store
//! - [`tool`] — the [`Tool`] trait and the total-dispatch [`ToolRegistry`]
//! - [`provider`] — the [`ChatClient`] seam to model backends
//! - [`channel`] — the [`Channel`] adapter trait
//! - [`error`] — the `thiserror` taxonomy
//!
//! It carries no HTTP, config or CLI machinery; those live in the
//! per-concern crates that depend on this one.

pub mod bus;
pub mod channel;
pub mod error;
pub mod message;
pub mod provider;
pub mod session;
pub mod tool;

pub use bus::{InboundMessage, MessageBus, OutboundMessage};
pub use channel::{sender_allowed, Channel};
pub use error::{ChannelError, Error, ProviderError, Result, ToolError};
pub use message::{ChatMessage, Role, ToolCallRequest};
pub use provider::{ChatClient, ChatRequest, ChatResponse};
pub use session::SessionStore;
pub use tool::{Tool, ToolDefinition, ToolRegistry};

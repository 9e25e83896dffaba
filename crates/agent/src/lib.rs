//! # ferroclaw-agent
//!
//! The conversation driver and its prompt assembly.
//!
//! - [`context`] — builds the system prompt from the workspace and the
//!   per-turn transcript
//! - [`loop_runner`] — the [`AgentLoop`]: bus consumption, the bounded
//!   tool-calling loop, and history commits

pub mod context;
pub mod loop_runner;

pub use context::{ContextBuilder, RUNTIME_CONTEXT_TAG};
pub use loop_runner::AgentLoop;

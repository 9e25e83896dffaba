//! # ferroclaw-channels
//!
//! Channel adapters: each adapter publishes what users say as inbound bus
//! messages and delivers outbound replies addressed to it. The CLI adapter
//! ships built in; platform adapters implement the same `Channel` trait.

pub mod cli;
pub mod registry;

pub use cli::CliChannel;
pub use registry::ChannelRegistry;

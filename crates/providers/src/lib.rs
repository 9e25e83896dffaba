//! # ferroclaw-providers
//!
//! Provider metadata and the HTTP chat client.
//!
//! - [`registry`] — the static provider table, model-name resolution, and
//!   credential selection
//! - [`openai_compat`] — the OpenAI-compatible [`OpenAiCompatClient`]

pub mod openai_compat;
pub mod registry;

pub use openai_compat::OpenAiCompatClient;
pub use registry::{
    detect, find_by_model, find_by_name, find_gateway, resolve_model, select_credentials,
    Credentials, ProviderSpec, PROVIDERS,
};

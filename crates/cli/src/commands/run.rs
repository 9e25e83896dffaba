//! `ferroclaw run` — Interactive or single-message chat mode.

use std::sync::Arc;

use ferroclaw_agent::{AgentLoop, ContextBuilder};
use ferroclaw_channels::{ChannelRegistry, CliChannel};
use ferroclaw_config::AppConfig;
use ferroclaw_core::bus::{InboundMessage, MessageBus};
use ferroclaw_core::session::SessionStore;
use ferroclaw_providers::{resolve_model, select_credentials, OpenAiCompatClient};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let creds = match select_credentials(&config) {
        Ok(creds) => creds,
        Err(e) => {
            eprintln!();
            eprintln!("  ERROR: {e}");
            eprintln!();
            eprintln!("  Add an API key to your config file:");
            eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
            eprintln!();
            eprintln!("  Or export one of the provider environment variables,");
            eprintln!("  e.g. DEEPSEEK_API_KEY or OPENROUTER_API_KEY.");
            eprintln!();
            return Err("No API key found. See above for setup instructions.".into());
        }
    };

    let model = resolve_model(
        &config.default_model,
        &creds.api_key,
        creds.api_base.as_deref().unwrap_or(""),
        &config.default_provider,
    );

    let workspace = config.workspace_dir();
    std::fs::create_dir_all(&workspace)?;

    let bus = Arc::new(MessageBus::new());
    let client = Arc::new(OpenAiCompatClient::from_credentials(&creds));
    let tools = Arc::new(ferroclaw_tools::default_registry(&workspace, bus.clone()));
    let sessions = Arc::new(SessionStore::new(config.agent.memory_window));
    let context = ContextBuilder::new(&workspace);

    let agent = AgentLoop::new(bus.clone(), client, tools, sessions, context, &model)
        .with_temperature(config.agent.temperature)
        .with_max_tokens(config.agent.max_tokens)
        .with_max_iterations(config.agent.max_iterations);

    let agent_handle = tokio::spawn(async move { agent.run().await });

    if let Some(msg) = message {
        // Single message mode: one inbound, one reply, done.
        bus.publish_inbound(InboundMessage::new("cli", "local", "direct", msg));
        let reply = bus.consume_outbound().await;
        println!("{}", reply.content);
        agent_handle.abort();
        return Ok(());
    }

    println!();
    println!("  Ferroclaw — Interactive Mode");
    println!("  Provider:  {}", creds.provider.display_name);
    println!("  Model:     {model}");
    println!("  Workspace: {}", workspace.display());
    println!();

    let mut channels = ChannelRegistry::new();
    let cli_config = config.channels.get("cli");
    if cli_config.map(|c| c.enabled).unwrap_or(true) {
        let allow_from = cli_config.map(|c| c.allow_from.clone()).unwrap_or_default();
        channels.register(Arc::new(
            CliChannel::new(bus.clone()).with_allow_from(allow_from),
        ));
    }
    for handle in channels.run_all() {
        handle.await?;
    }

    agent_handle.abort();
    Ok(())
}

//! `ferroclaw status` — Show system status.

use ferroclaw_config::AppConfig;
use ferroclaw_providers::{resolve_model, select_credentials};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🦀 Ferroclaw Status");
    println!("===================");
    println!("  Config dir:      {}", AppConfig::config_dir().display());
    println!("  Workspace:       {}", config.workspace_dir().display());
    println!("  Provider:        {}", config.default_provider);
    println!("  Model:           {}", config.default_model);
    println!("  Temperature:     {}", config.agent.temperature);
    println!("  Max iterations:  {}", config.agent.max_iterations);
    println!("  Memory window:   {}", config.agent.memory_window);

    match select_credentials(&config) {
        Ok(creds) => {
            let model = resolve_model(
                &config.default_model,
                &creds.api_key,
                creds.api_base.as_deref().unwrap_or(""),
                &config.default_provider,
            );
            let base = creds
                .api_base
                .as_deref()
                .unwrap_or(creds.provider.default_api_base);
            println!("\n  ✅ Credentials:  {}", creds.provider.display_name);
            println!("  Routed model:    {model}");
            println!("  API base:        {base}");
        }
        Err(e) => {
            println!("\n  ⚠️  {e}");
        }
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `ferroclaw onboard` first");
    }

    Ok(())
}

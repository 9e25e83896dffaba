//! Provider registry — single source of truth for model provider metadata.
//!
//! The table is static data; everything that consults it is a pure function,
//! so resolution is deterministic and trivially testable.

use ferroclaw_config::{AppConfig, ConfigError};

/// Metadata for one known provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSpec {
    /// Config field name, e.g. "volcengine"
    pub name: &'static str,

    /// Model-name keywords for matching (lowercase)
    pub keywords: &'static [&'static str],

    /// Env var holding the API key, e.g. "VOLCENGINE_API_KEY"
    pub env_key: &'static str,

    /// Shown in status output
    pub display_name: &'static str,

    /// Fallback base URL
    pub default_api_base: &'static str,

    /// Prefix for the routed model name, e.g. "volcengine"
    pub model_prefix: &'static str,

    /// Don't prefix if the model already starts with one of these
    pub skip_prefixes: &'static [&'static str],

    /// Routes any model (OpenRouter, VolcEngine)
    pub is_gateway: bool,

    /// Detect gateway by api_key prefix, e.g. "sk-or-"
    pub key_prefix: &'static str,

    /// Detect gateway by substring in the api_base URL
    pub base_keyword: &'static str,
}

pub static PROVIDERS: &[ProviderSpec] = &[
    // === Gateways (detected by api_key / api_base, not model name) ===
    ProviderSpec {
        name: "openrouter",
        keywords: &["openrouter"],
        env_key: "OPENROUTER_API_KEY",
        display_name: "OpenRouter",
        default_api_base: "https://openrouter.ai/api/v1",
        model_prefix: "openrouter",
        skip_prefixes: &[],
        is_gateway: true,
        key_prefix: "sk-or-",
        base_keyword: "openrouter",
    },
    ProviderSpec {
        name: "volcengine",
        keywords: &["volcengine", "volces", "ark"],
        env_key: "VOLCENGINE_API_KEY",
        display_name: "VolcEngine",
        default_api_base: "https://ark.cn-beijing.volces.com/api/coding/v3",
        model_prefix: "volcengine",
        skip_prefixes: &[],
        is_gateway: true,
        key_prefix: "",
        base_keyword: "volces",
    },
    // === Standard providers (matched by model-name keywords) ===
    ProviderSpec {
        name: "anthropic",
        keywords: &["anthropic", "claude"],
        env_key: "ANTHROPIC_API_KEY",
        display_name: "Anthropic",
        default_api_base: "https://api.anthropic.com/v1",
        model_prefix: "",
        skip_prefixes: &[],
        is_gateway: false,
        key_prefix: "",
        base_keyword: "",
    },
    ProviderSpec {
        name: "openai",
        keywords: &["openai", "gpt"],
        env_key: "OPENAI_API_KEY",
        display_name: "OpenAI",
        default_api_base: "https://api.openai.com/v1",
        model_prefix: "",
        skip_prefixes: &[],
        is_gateway: false,
        key_prefix: "",
        base_keyword: "",
    },
    ProviderSpec {
        name: "deepseek",
        keywords: &["deepseek"],
        env_key: "DEEPSEEK_API_KEY",
        display_name: "DeepSeek",
        default_api_base: "https://api.deepseek.com/v1",
        model_prefix: "deepseek",
        skip_prefixes: &["deepseek/"],
        is_gateway: false,
        key_prefix: "",
        base_keyword: "",
    },
    ProviderSpec {
        name: "gemini",
        keywords: &["gemini"],
        env_key: "GEMINI_API_KEY",
        display_name: "Gemini",
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
        model_prefix: "gemini",
        skip_prefixes: &["gemini/"],
        is_gateway: false,
        key_prefix: "",
        base_keyword: "",
    },
    ProviderSpec {
        name: "zhipu",
        keywords: &["zhipu", "glm", "zai"],
        env_key: "ZHIPUAI_API_KEY",
        display_name: "Zhipu AI",
        default_api_base: "https://open.bigmodel.cn/api/paasai/v4",
        model_prefix: "zai",
        skip_prefixes: &["zhipu/", "zai/"],
        is_gateway: false,
        key_prefix: "",
        base_keyword: "",
    },
    ProviderSpec {
        name: "dashscope",
        keywords: &["qwen", "dashscope"],
        env_key: "DASHSCOPE_API_KEY",
        display_name: "DashScope",
        default_api_base: "https://dashscope.aliyuncs.com/compatible-mode/v1",
        model_prefix: "dashscope",
        skip_prefixes: &["dashscope/"],
        is_gateway: false,
        key_prefix: "",
        base_keyword: "",
    },
    ProviderSpec {
        name: "moonshot",
        keywords: &["moonshot", "kimi"],
        env_key: "MOONSHOT_API_KEY",
        display_name: "Moonshot",
        default_api_base: "https://api.moonshot.cn/v1",
        model_prefix: "moonshot",
        skip_prefixes: &["moonshot/"],
        is_gateway: false,
        key_prefix: "",
        base_keyword: "",
    },
];

/// Find a provider by its config name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Find a provider by model name: an explicit `provider/...` path prefix
/// wins, then keyword matching (gateways are skipped — they route anything).
pub fn find_by_model(model: &str) -> Option<&'static ProviderSpec> {
    let model_lower = model.to_lowercase();
    let model_prefix = model_lower.split('/').next().unwrap_or_default();

    if let Some(spec) = PROVIDERS.iter().find(|spec| spec.name == model_prefix) {
        return Some(spec);
    }

    PROVIDERS
        .iter()
        .filter(|spec| !spec.is_gateway)
        .find(|spec| spec.keywords.iter().any(|kw| model_lower.contains(kw)))
}

/// Find a gateway by api_key prefix or api_base keyword.
pub fn find_gateway(api_key: &str, api_base: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().filter(|spec| spec.is_gateway).find(|spec| {
        (!spec.key_prefix.is_empty() && api_key.starts_with(spec.key_prefix))
            || (!spec.base_keyword.is_empty()
                && !api_base.is_empty()
                && api_base.contains(spec.base_keyword))
    })
}

/// Rewrite a model name with the routing prefix its provider expects.
///
/// Priority: explicit provider name, then gateway detection, then model-name
/// keywords, then unchanged.
pub fn resolve_model(model: &str, api_key: &str, api_base: &str, provider_name: &str) -> String {
    // Priority 1: explicit provider name from config
    if !provider_name.is_empty() {
        if let Some(spec) = find_by_name(provider_name) {
            if !spec.model_prefix.is_empty() && !model.starts_with(&format!("{}/", spec.model_prefix)) {
                let bare_model = model.rsplit('/').next().unwrap_or(model);
                return format!("{}/{}", spec.model_prefix, bare_model);
            }
        }
    }

    // Priority 2: gateway routes the whole model name
    if let Some(gateway) = find_gateway(api_key, api_base) {
        if !model.starts_with(&format!("{}/", gateway.model_prefix)) {
            return format!("{}/{}", gateway.model_prefix, model);
        }
        return model.to_string();
    }

    // Priority 3: standard provider by model keywords
    if let Some(spec) = find_by_model(model) {
        if !spec.model_prefix.is_empty() {
            if spec.skip_prefixes.iter().any(|p| model.starts_with(p)) {
                return model.to_string();
            }
            if !model.starts_with(&format!("{}/", spec.model_prefix)) {
                return format!("{}/{}", spec.model_prefix, model);
            }
        }
    }

    model.to_string()
}

/// Pick the spec a client should be built against, using the same priority
/// order as `resolve_model`.
pub fn detect(
    provider_name: &str,
    api_key: &str,
    api_base: &str,
    model: &str,
) -> Option<&'static ProviderSpec> {
    find_by_name(provider_name)
        .or_else(|| find_gateway(api_key, api_base))
        .or_else(|| find_by_model(model))
}

/// Resolved credentials for building a chat client.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub provider: &'static ProviderSpec,
    pub api_key: String,
    pub api_base: Option<String>,
}

/// Pick usable credentials from config + environment.
///
/// An explicitly configured `default_provider` wins when it has a key (from
/// its config entry or its env var). `"auto"` scans the registry in table
/// order and takes the first provider with a non-empty key.
pub fn select_credentials(config: &AppConfig) -> Result<Credentials, ConfigError> {
    let key_for = |spec: &'static ProviderSpec| -> Option<(String, Option<String>)> {
        let entry = config.provider(spec.name);
        let api_key = entry
            .and_then(|p| p.api_key.clone())
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(spec.env_key).ok().filter(|k| !k.is_empty()))?;
        Some((api_key, entry.and_then(|p| p.api_base.clone())))
    };

    if config.default_provider != "auto" {
        let spec = find_by_name(&config.default_provider).ok_or_else(|| {
            ConfigError::NoCredentials(format!("unknown provider '{}'", config.default_provider))
        })?;
        if let Some((api_key, api_base)) = key_for(spec) {
            return Ok(Credentials {
                provider: spec,
                api_key,
                api_base,
            });
        }
        return Err(ConfigError::NoCredentials(format!(
            "provider '{}' has no api_key (set [providers.{}] in config or {})",
            spec.name, spec.name, spec.env_key
        )));
    }

    for spec in PROVIDERS {
        if let Some((api_key, api_base)) = key_for(spec) {
            tracing::info!(provider = spec.name, "auto-selected provider credentials");
            return Ok(Credentials {
                provider: spec,
                api_key,
                api_base,
            });
        }
    }

    let hints: Vec<&str> = PROVIDERS.iter().map(|spec| spec.env_key).collect();
    Err(ConfigError::NoCredentials(format!(
        "no provider has an api_key; set one in config or export one of: {}",
        hints.join(", ")
    )))
}

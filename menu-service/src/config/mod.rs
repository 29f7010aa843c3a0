use crate::prompts::MenuSchema;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct MenuConfig {
    pub common: core_config::Config,
    pub openrouter: OpenRouterConfig,
    pub models: ModelConfig,
    pub menu: MenuSettings,
}

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Empty when unset; requests then fail upstream with 401.
    pub api_key: Secret<String>,
    pub base_url: String,
    /// Sent as `HTTP-Referer`.
    pub site_url: String,
    /// Sent as `X-Title`.
    pub app_name: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Chat model identifier, e.g. `openai/gpt-4o-mini`.
    pub chat_model: String,
}

#[derive(Debug, Clone)]
pub struct MenuSettings {
    pub schema: MenuSchema,
    pub static_dir: String,
}

impl MenuConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let timeout_secs = get_env(
            "UPSTREAM_TIMEOUT_SECS",
            Some(&DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string()),
            is_prod,
        )?
        .parse()
        .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);

        let schema = get_env("MENU_SCHEMA", Some("dual_plan"), is_prod)?
            .parse::<MenuSchema>()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

        Ok(MenuConfig {
            common: common_config,
            openrouter: OpenRouterConfig {
                // Missing key is reported at startup, never fatal.
                api_key: Secret::new(env::var("OPENROUTER_API_KEY").unwrap_or_default()),
                base_url: get_env(
                    "OPENROUTER_BASE_URL",
                    Some("https://openrouter.ai/api/v1"),
                    is_prod,
                )?,
                site_url: get_env("YOUR_SITE_URL", Some("http://localhost:5000"), is_prod)?,
                app_name: get_env("YOUR_APP_NAME", Some("MenuAdvisor"), is_prod)?,
                timeout: Duration::from_secs(timeout_secs),
            },
            models: ModelConfig {
                chat_model: get_env("CHAT_MODEL", Some("openai/gpt-4o-mini"), is_prod)?,
            },
            menu: MenuSettings {
                schema,
                static_dir: get_env("STATIC_DIR", Some("menu-service/static"), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

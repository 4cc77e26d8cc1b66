use std::env;

use crate::chat::ContextMode;
use crate::core::ChatError;

pub const DEFAULT_GREETING: &str = "I'm ready to answer questions about an LLMs Memory Usage, GPU capabilities, and Octo's available GPUs.";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub system_message: String,
    pub greeting: String,
    pub context_mode: ContextMode,
}

impl AppConfig {
    /// Read the config from the process environment.
    pub fn from_env() -> Result<Self, ChatError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. Secrets are required, the
    /// rest fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChatError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ChatError::Configuration(format!("Missing env var {}", key)))
        };

        let openai_api_key = required("COPILOT_API_KEY")?;
        let system_message = required("COPILOT_SYSTEM_PROMPT")?;

        let storage_path = lookup("COPILOT_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path.trim_end_matches('/'));
        let openai_api_hostname =
            lookup("COPILOT_API_HOST").unwrap_or_else(|| "https://text.octoai.run".to_string());
        let openai_model = lookup("COPILOT_MODEL")
            .unwrap_or_else(|| "meta-llama-3.1-70b-instruct".to_string());
        let max_tokens = parse_or(&lookup, "COPILOT_MAX_TOKENS", 4096)?;
        let request_timeout_secs = parse_or(&lookup, "COPILOT_REQUEST_TIMEOUT_SECS", 60)?;
        let greeting = lookup("COPILOT_GREETING").unwrap_or_else(|| DEFAULT_GREETING.to_string());
        let context_mode = match lookup("COPILOT_CONTEXT_MODE") {
            Some(mode) => mode.parse()?,
            None => ContextMode::default(),
        };

        Ok(Self {
            storage_path,
            db_path,
            openai_api_hostname,
            openai_api_key,
            openai_model,
            max_tokens,
            request_timeout_secs,
            system_message,
            greeting,
            context_mode,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ChatError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ChatError::Configuration(format!("Invalid value for {}: {}", key, raw))),
        None => Ok(default),
    }
}

//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Bot configuration, resolved from the environment at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Gemini API key. Required; startup fails without it.
    pub api_key: SecretString,
    /// Classifier model name.
    pub model: String,
    /// Path of the persisted user document.
    pub db_path: PathBuf,
    /// WhatsApp bridge base URL; the gateway channel is only registered
    /// when this is set.
    pub gateway_url: Option<String>,
    /// Include anthropometrics in the classifier prompt.
    pub personalized: bool,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;

        let model = std::env::var("NUTRIBOT_MODEL")
            .unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let db_path = std::env::var("NUTRIBOT_DB_PATH")
            .unwrap_or_else(|_| "./data/nutribot.json".to_string());

        let gateway_url = std::env::var("NUTRIBOT_GATEWAY_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let personalized = std::env::var("NUTRIBOT_PERSONALIZED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            api_key: SecretString::from(api_key),
            model,
            db_path: PathBuf::from(db_path),
            gateway_url,
            personalized,
        })
    }
}

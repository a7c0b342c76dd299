// flightai-core/src/config.rs

//! Handles configuration structures and parsing for the assistant.
//!
//! Every section is optional; an empty file (or no file at all) yields the
//! stock FlightAI demo: `gpt-4o-mini` for chat, `dall-e-3` for images,
//! `tts-1`/`onyx` for speech and the built-in price table.

use crate::catalog::PriceCatalog;
use crate::errors::FlightAiError;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant for an Airline called FlightAI. \
Give short, courteous answers, no more than 1 sentence. \
Always be accurate. If you don't know the answer, say so.";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FlightAiConfig {
    pub system_prompt: String,
    pub api_key_env_var: String,
    pub base_url: String,
    /// Per-request timeout for the remote services. None keeps reqwest's default.
    pub timeout_secs: Option<u64>,
    pub chat: ChatConfig,
    pub image: ImageConfig,
    pub speech: SpeechConfig,
    /// City → price. Empty means the built-in table.
    pub prices: BTreeMap<String, String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    pub model_name: String,
    /// Extra request fields (e.g. `temperature`) merged into every chat request.
    pub parameters: Option<toml::Value>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ImageConfig {
    pub enabled: bool,
    pub model: String,
    pub size: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    pub model: String,
    pub voice: String,
}

impl Default for FlightAiConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            api_key_env_var: DEFAULT_API_KEY_ENV_VAR.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            chat: ChatConfig::default(),
            image: ImageConfig::default(),
            speech: SpeechConfig::default(),
            prices: BTreeMap::new(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model_name: "gpt-4o-mini".to_string(),
            parameters: None,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "tts-1".to_string(),
            voice: "onyx".to_string(),
        }
    }
}

impl FlightAiConfig {
    pub fn from_toml_str(config_toml_content: &str) -> Result<FlightAiConfig> {
        let config: FlightAiConfig = match toml::from_str(config_toml_content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse TOML content");
                return Err(anyhow!(e))
                    .context("Failed to parse configuration TOML content. Check TOML syntax.");
            }
        };
        config.validate()?;
        tracing::info!("Successfully parsed and validated configuration.");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.system_prompt.trim().is_empty() {
            return Err(anyhow!("'system_prompt' in config content is empty."));
        }
        if self.api_key_env_var.trim().is_empty() {
            return Err(anyhow!("'api_key_env_var' in config content is empty."));
        }
        Url::parse(&self.base_url).with_context(|| {
            format!("Invalid URL format for 'base_url' ('{}').", self.base_url)
        })?;
        if self.timeout_secs == Some(0) {
            return Err(anyhow!("'timeout_secs' must be greater than zero."));
        }
        if self.chat.model_name.trim().is_empty() {
            return Err(anyhow!("'chat.model_name' is empty."));
        }
        if let Some(params) = &self.chat.parameters {
            if !params.is_table() {
                return Err(anyhow!(
                    "'chat.parameters' is invalid. Expected a TOML table."
                ));
            }
        }
        if self.image.enabled {
            if self.image.model.trim().is_empty() {
                return Err(anyhow!("'image.model' is empty."));
            }
            if !is_valid_size(&self.image.size) {
                return Err(anyhow!(
                    "'image.size' ('{}') must look like WIDTHxHEIGHT, e.g. 1024x1024.",
                    self.image.size
                ));
            }
        }
        if self.speech.enabled
            && (self.speech.model.trim().is_empty() || self.speech.voice.trim().is_empty())
        {
            return Err(anyhow!("'speech.model' and 'speech.voice' must both be set."));
        }
        for (city, price) in &self.prices {
            if city.trim().is_empty() || price.trim().is_empty() {
                return Err(anyhow!(
                    "[prices] entries need a non-empty city and price (got '{}' = '{}').",
                    city,
                    price
                ));
            }
        }
        Ok(())
    }

    /// Reads the API key from the environment variable named in the config.
    pub fn resolve_api_key(&self) -> Result<String, FlightAiError> {
        match std::env::var(&self.api_key_env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(FlightAiError::MissingApiKey(self.api_key_env_var.clone())),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn catalog(&self) -> PriceCatalog {
        if self.prices.is_empty() {
            PriceCatalog::default()
        } else {
            PriceCatalog::from_entries(&self.prices)
        }
    }

    /// `{base_url}/{path}` without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn is_valid_size(size: &str) -> bool {
    match size.split_once('x') {
        Some((w, h)) => w.parse::<u32>().is_ok_and(|w| w > 0) && h.parse::<u32>().is_ok_and(|h| h > 0),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config_content() -> String {
        r#"
            system_prompt = "You are FlightAI."
            api_key_env_var = "FLIGHTAI_TEST_KEY"
            base_url = "http://localhost:9999/v1/"
            timeout_secs = 30

            [chat]
            model_name = "gpt-4o"
            parameters = { temperature = 0.2 }

            [image]
            enabled = false

            [speech]
            voice = "alloy"

            [prices]
            Rome = "$650"
            "New York" = "$900"
        "#
        .to_string()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = FlightAiConfig::from_toml_str("").unwrap();
        assert_eq!(config, FlightAiConfig::default());
        assert_eq!(config.chat.model_name, "gpt-4o-mini");
        assert_eq!(config.image.model, "dall-e-3");
        assert_eq!(config.speech.voice, "onyx");
        assert_eq!(config.catalog(), PriceCatalog::default());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_config_parse_success() {
        let content = full_config_content();
        let result = FlightAiConfig::from_toml_str(&content);
        assert!(result.is_ok(), "Parse failed: {:?}\nContent:\n{}", result.err(), content);
        let config = result.unwrap();
        assert_eq!(config.system_prompt, "You are FlightAI.");
        assert_eq!(config.chat.model_name, "gpt-4o");
        assert!(config.chat.parameters.is_some());
        assert!(!config.image.enabled);
        assert_eq!(config.image.model, "dall-e-3");
        assert_eq!(config.speech.voice, "alloy");
        assert_eq!(config.speech.model, "tts-1");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        let catalog = config.catalog();
        assert_eq!(catalog.lookup("rome"), "$650");
        assert_eq!(catalog.lookup("new york"), "$900");
        assert_eq!(catalog.lookup("Berlin"), "Unknown");
        assert_eq!(
            config.endpoint("/chat/completions"),
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn test_config_rejects_bad_base_url() {
        let result = FlightAiConfig::from_toml_str(r#"base_url = "not a url""#);
        let error_string = format!("{:#}", result.err().unwrap());
        assert!(error_string.contains("base_url"), "Unexpected error message: {}", error_string);
    }

    #[test]
    fn test_config_rejects_bad_image_size() {
        let result = FlightAiConfig::from_toml_str("[image]\nsize = \"huge\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_ignores_image_size_when_disabled() {
        let result = FlightAiConfig::from_toml_str("[image]\nenabled = false\nsize = \"huge\"");
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_rejects_non_table_parameters() {
        let result = FlightAiConfig::from_toml_str("[chat]\nparameters = \"hot\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_rejects_empty_price() {
        let result = FlightAiConfig::from_toml_str("[prices]\nParis = \"\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_rejects_invalid_toml() {
        assert!(FlightAiConfig::from_toml_str("system_prompt = ").is_err());
    }

    #[test]
    fn test_resolve_api_key_reports_missing_variable() {
        let config = FlightAiConfig {
            api_key_env_var: "FLIGHTAI_TEST_DEFINITELY_UNSET_KEY".to_string(),
            ..Default::default()
        };
        let err = config.resolve_api_key().unwrap_err();
        assert!(matches!(err, FlightAiError::MissingApiKey(ref var) if var == "FLIGHTAI_TEST_DEFINITELY_UNSET_KEY"));
    }
}

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::fetch::FetchSettings;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_API_BASE: &str = "OPENAI_API_BASE";
pub const ENV_MODEL: &str = "CONDENSER_MODEL";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingApiKey(&'static str),
}

/// Credentials and endpoint for the completion service.
///
/// Loaded once at startup; a missing API key is fatal before any job runs.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(ENV_API_KEY)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingApiKey(ENV_API_KEY))?;
        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup(ENV_API_BASE) {
            config.base_url = base_url;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            config.model = model;
        }
        Ok(config)
    }
}

/// Tunables for the summarization pipeline.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub fetch: FetchSettings,
    pub max_chunk_tokens: u32,
    pub map_prompt: String,
    pub reduce_prompt: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            max_chunk_tokens: crate::chunk::DEFAULT_MAX_TOKENS,
            map_prompt: crate::summarize::MAP_PROMPT.to_string(),
            reduce_prompt: crate::summarize::REDUCE_PROMPT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let err = ApiConfig::from_lookup(vars(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey(ENV_API_KEY));
    }

    #[test]
    fn empty_api_key_is_a_config_error() {
        let err = ApiConfig::from_lookup(vars(&[(ENV_API_KEY, "")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey(ENV_API_KEY));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = ApiConfig::from_lookup(vars(&[(ENV_API_KEY, "sk-test")])).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn base_url_and_model_overrides_are_honoured() {
        let config = ApiConfig::from_lookup(vars(&[
            (ENV_API_KEY, "sk-test"),
            (ENV_API_BASE, "http://localhost:9000/v1"),
            (ENV_MODEL, "gpt-4"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.model, "gpt-4");
    }
}

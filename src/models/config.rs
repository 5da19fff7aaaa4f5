//! Configuration module for the Summarizer
//!
//! Defaults come from utils/constants.rs; every value can be overridden
//! through the environment. Malformed values are rejected at startup instead
//! of silently falling back.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::errors::{AppError, AppResult};
use crate::core::params::ModelFamilies;
use crate::utils::constants::*;

/// Numeric knobs for chat-completion requests
#[derive(Debug, Clone, PartialEq)]
pub struct ApiDefaults {
    pub temperature: f64,
    pub max_tokens: u32,
    pub gpt5_max_tokens: u32,
}

impl Default for ApiDefaults {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            gpt5_max_tokens: GPT5_MAX_TOKENS,
        }
    }
}

/// Size limits applied before anything reaches OpenAI
#[derive(Debug, Clone, PartialEq)]
pub struct ContentLimits {
    pub max_text_length: usize,
    pub max_url_content_length: usize,
    pub url_timeout: Duration,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            max_text_length: MAX_TEXT_LENGTH,
            max_url_content_length: MAX_URL_CONTENT_LENGTH,
            url_timeout: Duration::from_secs(URL_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// OpenAI connection settings
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Never logged
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<hidden>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_OPENAI_TIMEOUT_SECS),
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub media_root: PathBuf,
    pub openai: OpenAiConfig,
    pub families: ModelFamilies,
    pub api_defaults: ApiDefaults,
    pub limits: ContentLimits,
    pub blog_model: String,
    pub rate_limit: u32,
    pub rate_window: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            openai: OpenAiConfig::default(),
            families: ModelFamilies::default(),
            api_defaults: ApiDefaults::default(),
            limits: ContentLimits::default(),
            blog_model: DEFAULT_BLOG_MODEL.to_string(),
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_window: Duration::from_secs(DEFAULT_RATE_WINDOW_SECS),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup(ENV_OPENAI_API_KEY).filter(|k| !k.trim().is_empty());
        if api_key.is_some() {
            info!("🔑 OPENAI_API_KEY configured (key hidden for security)");
        }

        let families = ModelFamilies {
            newer_models: lookup(ENV_NEWER_MODELS)
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.families.newer_models),
            restricted_temp_models: lookup(ENV_RESTRICTED_TEMP_MODELS)
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.families.restricted_temp_models),
            gpt5_nano_models: lookup(ENV_GPT5_NANO_MODELS)
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.families.gpt5_nano_models),
        };

        // Railway-style PORT wins over the app-specific variable
        let port = match lookup(ENV_PLATFORM_PORT).or_else(|| lookup(ENV_PORT)) {
            Some(raw) => parse_value(ENV_PORT, &raw)?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup(ENV_HOST).unwrap_or(defaults.host),
            port,
            database_url: lookup(ENV_DATABASE_URL).unwrap_or(defaults.database_url),
            media_root: lookup(ENV_MEDIA_ROOT)
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            openai: OpenAiConfig {
                api_key,
                base_url: lookup(ENV_OPENAI_BASE_URL)
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.openai.base_url),
                timeout: Duration::from_secs(parse_or(
                    &lookup,
                    ENV_OPENAI_TIMEOUT_SECS,
                    DEFAULT_OPENAI_TIMEOUT_SECS,
                )?),
            },
            families,
            api_defaults: ApiDefaults {
                temperature: parse_or(&lookup, ENV_DEFAULT_TEMPERATURE, DEFAULT_TEMPERATURE)?,
                max_tokens: parse_or(&lookup, ENV_DEFAULT_MAX_TOKENS, DEFAULT_MAX_TOKENS)?,
                gpt5_max_tokens: parse_or(&lookup, ENV_GPT5_MAX_TOKENS, GPT5_MAX_TOKENS)?,
            },
            limits: ContentLimits {
                max_text_length: parse_or(&lookup, ENV_MAX_TEXT_LENGTH, MAX_TEXT_LENGTH)?,
                max_url_content_length: parse_or(
                    &lookup,
                    ENV_MAX_URL_CONTENT_LENGTH,
                    MAX_URL_CONTENT_LENGTH,
                )?,
                url_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    ENV_URL_TIMEOUT_SECS,
                    URL_REQUEST_TIMEOUT_SECS,
                )?),
            },
            blog_model: lookup(ENV_BLOG_MODEL).unwrap_or(defaults.blog_model),
            rate_limit: parse_or(&lookup, ENV_RATE_LIMIT, DEFAULT_RATE_LIMIT)?,
            rate_window: Duration::from_secs(parse_or(
                &lookup,
                ENV_RATE_WINDOW_SECS,
                DEFAULT_RATE_WINDOW_SECS,
            )?),
        })
    }

    /// Socket address the API server binds to
    pub fn bind_addr(&self) -> AppResult<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| AppError::invalid_config(ENV_HOST, &raw))
    }

    /// Directory generated blog posts are written to
    pub fn blogs_dir(&self) -> PathBuf {
        self.media_root.join(BLOGS_DIR)
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::invalid_config(key, raw))
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppResult<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_defaults.max_tokens, 150);
        assert_eq!(config.api_defaults.gpt5_max_tokens, 300);
        assert_eq!(config.limits.max_text_length, 50_000);
        assert_eq!(config.limits.url_timeout, Duration::from_secs(10));
        assert_eq!(config.families.newer_models.len(), 5);
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.blogs_dir(), PathBuf::from("media").join("blogs"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "3000"),
            ("SUMMARIZER_PORT", "4000"),
            ("SUMMARIZER_NEWER_MODELS", "o3, gpt-4.1"),
            ("SUMMARIZER_DEFAULT_TEMPERATURE", "0.2"),
            ("OPENAI_BASE_URL", "http://localhost:9999/v1/"),
            ("OPENAI_API_KEY", "sk-test"),
        ])
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.families.newer_models, vec!["o3", "gpt-4.1"]);
        assert_eq!(config.api_defaults.temperature, 0.2);
        assert_eq!(config.openai.base_url, "http://localhost:9999/v1");
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = config_from(&[("OPENAI_API_KEY", "  ")]).unwrap();
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn test_invalid_value_rejected() {
        let err = config_from(&[("SUMMARIZER_MAX_TEXT_LENGTH", "lots")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-secret")]).unwrap();
        let rendered = format!("{:?}", config.openai);
        assert!(!rendered.contains("sk-secret"));
    }
}

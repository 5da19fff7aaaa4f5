//! OpenAI Chat Completions Client
//!
//! Thin reqwest wrapper around `POST /chat/completions` and `GET /models`.
//! Every failure is mapped onto an `AppError` whose message can be shown to
//! the end user as-is; the raw upstream detail only goes to the logs.
//!
//! API: https://api.openai.com/v1/chat/completions

use reqwest::{header, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::core::params::ChatRequest;
use crate::models::config::OpenAiConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::{
    MSG_AI_AUTH, MSG_AI_CONTEXT_LENGTH, MSG_AI_MODEL_CONFIG, MSG_AI_RATE_LIMIT,
    MSG_AI_UNAVAILABLE, MSG_UNEXPECTED, USER_AGENT,
};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Map a non-2xx OpenAI response onto a user-facing error
pub fn classify_api_error(status: u16, body: &str) -> AppError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_default();

    match status {
        401 => {
            error!("OpenAI authentication error: {}", detail);
            AppError::new(ErrorCode::AiAuthFailed, MSG_AI_AUTH)
        }
        429 => {
            warn!("OpenAI rate limit exceeded: {}", detail);
            AppError::new(ErrorCode::AiRateLimited, MSG_AI_RATE_LIMIT)
        }
        _ => {
            error!("OpenAI API error ({}): {}", status, body);
            // the raw body carries `param` and `code`, not just the message
            let haystack = body.to_lowercase();
            if haystack.contains("max_tokens") {
                AppError::new(ErrorCode::AiModelConfig, MSG_AI_MODEL_CONFIG)
            } else if haystack.contains("context_length") {
                AppError::new(ErrorCode::AiContextLength, MSG_AI_CONTEXT_LENGTH)
            } else {
                AppError::new(ErrorCode::AiUnavailable, MSG_AI_UNAVAILABLE)
            }
        }
    }
}

fn classify_transport_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        error!("OpenAI API error: {}", err);
        AppError::with_source(ErrorCode::AiUnavailable, MSG_AI_UNAVAILABLE, err)
    } else {
        error!("Unexpected OpenAI API error: {:?}", err);
        AppError::unexpected(err)
    }
}

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(AppError::unexpected)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            error!("OpenAI API key is not configured");
            AppError::new(ErrorCode::ConfigMissingApiKey, MSG_UNEXPECTED)
        })
    }

    /// Run a chat completion. `Ok(None)` means the model answered with nothing
    /// but whitespace.
    pub async fn complete(&self, request: &ChatRequest) -> AppResult<Option<String>> {
        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            model = %request.model,
            temperature = request.temperature,
            token_key = request.token_limit.key(),
            token_value = request.token_limit.value(),
            "OpenAI chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", api_key))
            .json(request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(classify_api_error(status.as_u16(), &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Unexpected OpenAI API error: malformed response: {}", e);
            AppError::unexpected(e)
        })?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            error!("Unexpected OpenAI API error: response had no choices");
            AppError::new(ErrorCode::AiUnexpected, MSG_UNEXPECTED)
        })?;

        match choice.message.content.map(|c| c.trim().to_string()) {
            Some(content) if !content.is_empty() => Ok(Some(content)),
            _ => {
                warn!("Empty or whitespace-only response from OpenAI API");
                Ok(None)
            }
        }
    }

    /// List model ids visible to the configured key
    pub async fn list_models(&self) -> AppResult<Vec<String>> {
        let api_key = self.api_key()?;
        let url = format!("{}/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", api_key))
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status.as_u16(), &body));
        }

        let list: ModelList = response.json().await.map_err(AppError::unexpected)?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<hidden>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth_and_rate_limit() {
        let err = classify_api_error(401, r#"{"error":{"message":"Incorrect API key"}}"#);
        assert_eq!(err.code, ErrorCode::AiAuthFailed);
        assert_eq!(err.message, MSG_AI_AUTH);

        let err = classify_api_error(429, "");
        assert_eq!(err.code, ErrorCode::AiRateLimited);
        assert_eq!(err.message, MSG_AI_RATE_LIMIT);
    }

    #[test]
    fn test_classify_max_tokens_and_context_length() {
        let body = r#"{"error":{"message":"Unsupported parameter: 'max_tokens' is not supported with this model.","param":"max_tokens"}}"#;
        let err = classify_api_error(400, body);
        assert_eq!(err.code, ErrorCode::AiModelConfig);
        assert_eq!(err.message, MSG_AI_MODEL_CONFIG);

        let body = r#"{"error":{"message":"This model's maximum context length is 16385 tokens.","code":"context_length_exceeded"}}"#;
        let err = classify_api_error(400, body);
        assert_eq!(err.code, ErrorCode::AiContextLength);
        assert_eq!(err.message, MSG_AI_CONTEXT_LENGTH);
    }

    #[test]
    fn test_classify_generic_api_error() {
        let err = classify_api_error(500, "upstream exploded");
        assert_eq!(err.code, ErrorCode::AiUnavailable);
        assert_eq!(err.message, MSG_AI_UNAVAILABLE);
        assert_ne!(err.message, MSG_UNEXPECTED);
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = OpenAiClient::new(&OpenAiConfig::default()).unwrap();
        assert!(!client.has_api_key());
        let req = ChatRequest::fixed(
            "gpt-4o",
            "s",
            "u",
            0.5,
            crate::core::params::TokenLimit::MaxTokens(10),
        );
        let err = client.complete(&req).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigMissingApiKey);
        assert_eq!(err.message, MSG_UNEXPECTED);
    }
}

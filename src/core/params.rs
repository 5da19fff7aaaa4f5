//! Chat-completion parameter selection
//!
//! OpenAI model families disagree on request shape: newer models want
//! `max_completion_tokens` instead of `max_tokens`, and some only accept the
//! default temperature. Membership is decided by substring match of the model
//! name against three configurable lists, so dated snapshots such as
//! `gpt-4o-2024-05-13` inherit their family's rules.

use serde::Serialize;

use crate::models::config::ApiDefaults;
use crate::utils::constants::{
    GPT5_NANO_MODELS, NEWER_MODELS, RESTRICTED_TEMPERATURE, RESTRICTED_TEMP_MODELS,
};

/// The three model-family lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFamilies {
    /// Take `max_completion_tokens`
    pub newer_models: Vec<String>,
    /// Only accept temperature 1
    pub restricted_temp_models: Vec<String>,
    /// Get the larger GPT-5 completion budget
    pub gpt5_nano_models: Vec<String>,
}

impl Default for ModelFamilies {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            newer_models: owned(&NEWER_MODELS),
            restricted_temp_models: owned(&RESTRICTED_TEMP_MODELS),
            gpt5_nano_models: owned(&GPT5_NANO_MODELS),
        }
    }
}

fn matches_any(model_name: &str, family: &[String]) -> bool {
    family.iter().any(|entry| model_name.contains(entry.as_str()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Token cap, serialized under whichever key the model family expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenLimit {
    MaxTokens(u32),
    MaxCompletionTokens(u32),
}

impl TokenLimit {
    /// JSON key this limit is sent under
    pub fn key(&self) -> &'static str {
        match self {
            Self::MaxTokens(_) => "max_tokens",
            Self::MaxCompletionTokens(_) => "max_completion_tokens",
        }
    }

    pub fn value(&self) -> u32 {
        match self {
            Self::MaxTokens(n) | Self::MaxCompletionTokens(n) => *n,
        }
    }
}

/// Request body for `POST /chat/completions`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    #[serde(flatten)]
    pub token_limit: TokenLimit,
}

impl ChatRequest {
    /// Request with explicit parameters, bypassing family selection
    pub fn fixed(
        model: impl Into<String>,
        system_message: impl Into<String>,
        user_content: impl Into<String>,
        temperature: f64,
        token_limit: TokenLimit,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage::system(system_message),
                ChatMessage::user(user_content),
            ],
            temperature,
            token_limit,
        }
    }
}

/// Builds chat requests from model families and numeric defaults
#[derive(Debug, Clone, Default)]
pub struct ApiParams {
    families: ModelFamilies,
    defaults: ApiDefaults,
}

impl ApiParams {
    pub fn new(families: ModelFamilies, defaults: ApiDefaults) -> Self {
        Self { families, defaults }
    }

    pub fn families(&self) -> &ModelFamilies {
        &self.families
    }

    /// Temperature for a model: forced to 1 for restricted families
    pub fn temperature_for(&self, model_name: &str) -> f64 {
        if matches_any(model_name, &self.families.restricted_temp_models) {
            RESTRICTED_TEMPERATURE
        } else {
            self.defaults.temperature
        }
    }

    /// Token limit for a model. GPT-5 nano wins over the generic newer-model rule.
    pub fn token_limit_for(&self, model_name: &str) -> TokenLimit {
        if matches_any(model_name, &self.families.gpt5_nano_models) {
            TokenLimit::MaxCompletionTokens(self.defaults.gpt5_max_tokens)
        } else if matches_any(model_name, &self.families.newer_models) {
            TokenLimit::MaxCompletionTokens(self.defaults.max_tokens)
        } else {
            TokenLimit::MaxTokens(self.defaults.max_tokens)
        }
    }

    /// Full request for a system/user message pair
    pub fn build(&self, model_name: &str, system_message: &str, user_content: &str) -> ChatRequest {
        ChatRequest::fixed(
            model_name,
            system_message,
            user_content,
            self.temperature_for(model_name),
            self.token_limit_for(model_name),
        )
    }
}

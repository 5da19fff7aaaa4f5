//! Summary Service
//!
//! Text and URL summarization on top of the OpenAI client. The caller is
//! responsible for the access check; this layer assumes `model_name` has
//! already been granted.

use tracing::info;

use super::content::ContentProcessor;
use super::params::{ApiParams, ChatRequest};
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::providers::openai::OpenAiClient;
use crate::utils::constants::{
    MSG_EMPTY_RESPONSE, TEXT_PROMPT_PREFIX, URL_PROMPT_PREFIX, URL_SYSTEM_MESSAGE,
};

#[derive(Clone)]
pub struct SummaryService {
    openai: OpenAiClient,
    params: ApiParams,
    content: ContentProcessor,
}

impl SummaryService {
    pub fn new(openai: OpenAiClient, params: ApiParams, content: ContentProcessor) -> Self {
        Self {
            openai,
            params,
            content,
        }
    }

    pub fn openai(&self) -> &OpenAiClient {
        &self.openai
    }

    pub fn params(&self) -> &ApiParams {
        &self.params
    }

    /// Summarize raw text
    pub async fn summarize_text(
        &self,
        text: &str,
        model_name: &str,
        system_message: &str,
    ) -> AppResult<String> {
        self.content.validate_text_length(text)?;

        let request = self.params.build(
            model_name,
            system_message,
            &format!("{}{}", TEXT_PROMPT_PREFIX, text),
        );
        self.run(&request).await
    }

    /// Fetch a page and summarize its visible text
    pub async fn summarize_url(&self, url: &str, model_name: &str) -> AppResult<String> {
        let text = self.content.extract_text_from_url(url).await?;

        let request = self.params.build(
            model_name,
            URL_SYSTEM_MESSAGE,
            &format!("{}{}", URL_PROMPT_PREFIX, text),
        );
        self.run(&request).await
    }

    async fn run(&self, request: &ChatRequest) -> AppResult<String> {
        let summary = self
            .openai
            .complete(request)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::AiEmptyResponse, MSG_EMPTY_RESPONSE))?;

        info!(
            model = %request.model,
            summary_chars = summary.chars().count(),
            "Summary generated"
        );
        Ok(summary)
    }
}

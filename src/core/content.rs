//! Content processing: length validation and URL text extraction

use tracing::info;

use crate::models::config::ContentLimits;
use crate::models::errors::{AppError, AppResult};
use crate::providers::web::{html_to_text, truncate_chars, PageFetcher};
use crate::utils::constants::format_thousands;

#[derive(Clone)]
pub struct ContentProcessor {
    limits: ContentLimits,
    fetcher: PageFetcher,
}

impl ContentProcessor {
    pub fn new(limits: ContentLimits) -> AppResult<Self> {
        let fetcher = PageFetcher::new(limits.url_timeout)?;
        Ok(Self { limits, fetcher })
    }

    pub fn limits(&self) -> &ContentLimits {
        &self.limits
    }

    /// Reject text longer than the configured character limit
    pub fn validate_text_length(&self, text: &str) -> AppResult<()> {
        let len = text.chars().count();
        if len > self.limits.max_text_length {
            return Err(AppError::too_long(format!(
                "Text is too long ({} characters). Maximum allowed is {} characters.",
                format_thousands(len),
                format_thousands(self.limits.max_text_length),
            )));
        }
        Ok(())
    }

    /// Fetch `url` and return its visible text, capped at the URL content limit
    pub async fn extract_text_from_url(&self, url: &str) -> AppResult<String> {
        let html = self.fetcher.fetch(url).await?;
        let text = html_to_text(&html);
        let capped = truncate_chars(&text, self.limits.max_url_content_length);
        info!(
            url = %url,
            extracted_chars = capped.chars().count(),
            "Extracted page text"
        );
        Ok(capped.to_string())
    }
}

//! Web Page Fetcher
//!
//! Downloads a page and flattens its HTML into plain text for summarizing.

use scraper::{Html, Node};
use std::time::Duration;
use tracing::{error, info};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::USER_AGENT;

/// Elements whose text is never visible content
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// HTTP client for fetching pages to summarize
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(AppError::unexpected)?;
        Ok(Self { client })
    }

    /// Fetch the raw body of `url`. Non-2xx statuses are errors.
    pub async fn fetch(&self, url: &str) -> AppResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!("Error fetching URL {}: {}", url, e);
                AppError::fetch_failed(format!("Error fetching the URL: {}", e))
            })?;

        let body = response.text().await.map_err(|e| {
            error!("Error reading body of {}: {}", url, e);
            AppError::fetch_failed(format!("Error fetching the URL: {}", e))
        })?;

        info!("🌐 Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

/// Visible text of an HTML document: each text node is trimmed, blanks are
/// dropped and the rest joined with single spaces.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut pieces: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|el| SKIPPED_ELEMENTS.contains(&el.name()))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed);
        }
    }

    pieces.join(" ")
}

/// First `max_chars` characters of `text` (never splits a code point)
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_joins_and_strips() {
        let html = r#"<html><head><title> Title </title></head>
            <body><h1>Hello</h1>
              <p>  first   paragraph </p>
              <div><span>nested</span> tail</div>
            </body></html>"#;
        assert_eq!(html_to_text(html), "Title Hello first   paragraph nested tail");
    }

    #[test]
    fn test_html_to_text_skips_scripts_and_styles() {
        let html = "<body><script>var x = 1;</script><style>p{}</style><p>visible</p></body>";
        assert_eq!(html_to_text(html), "visible");
    }

    #[test]
    fn test_html_to_text_plain_input() {
        assert_eq!(html_to_text("just text"), "just text");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 0), "");
    }
}

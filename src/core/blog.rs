//! Blog post generation
//!
//! Turns a summary into a standalone HTML page under `<media_root>/blogs/`
//! and returns the public URL it is served from.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{error, info};

use super::params::{ChatRequest, TokenLimit};
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::providers::openai::OpenAiClient;
use crate::utils::constants::{
    BLOGS_DIR, BLOG_MAX_TOKENS, BLOG_SYSTEM_MESSAGE, BLOG_TEMPERATURE, MSG_EMPTY_RESPONSE,
    MSG_NO_SUMMARY,
};

/// A blog page written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct BlogPost {
    pub file_name: String,
    pub path: PathBuf,
    pub url: String,
}

#[derive(Clone)]
pub struct BlogService {
    openai: OpenAiClient,
    model: String,
    blogs_dir: PathBuf,
}

impl BlogService {
    pub fn new(openai: OpenAiClient, model: impl Into<String>, blogs_dir: PathBuf) -> Self {
        Self {
            openai,
            model: model.into(),
            blogs_dir,
        }
    }

    pub fn blogs_dir(&self) -> &PathBuf {
        &self.blogs_dir
    }

    /// Generate a blog post from `summary` for `username`.
    /// `base_url` is the scheme+host the media route is reachable at.
    pub async fn create_blog(
        &self,
        username: &str,
        summary: &str,
        source_url: &str,
        base_url: &str,
    ) -> AppResult<BlogPost> {
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(AppError::empty_input(MSG_NO_SUMMARY));
        }

        let request = ChatRequest::fixed(
            &self.model,
            BLOG_SYSTEM_MESSAGE,
            blog_prompt(summary),
            BLOG_TEMPERATURE,
            TokenLimit::MaxTokens(BLOG_MAX_TOKENS),
        );
        let content = self
            .openai
            .complete(&request)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::AiEmptyResponse, MSG_EMPTY_RESPONSE))?;

        let file_name = blog_file_name(username);
        let path = self.blogs_dir.join(&file_name);
        let page = render_blog_page(username, &content, source_url, Utc::now());

        tokio::fs::create_dir_all(&self.blogs_dir).await.map_err(|e| {
            error!("Failed to create blog directory {:?}: {}", self.blogs_dir, e);
            AppError::from(e)
        })?;
        tokio::fs::write(&path, page).await.map_err(|e| {
            error!("Failed to write blog {:?}: {}", path, e);
            AppError::from(e)
        })?;

        let url = format!(
            "{}/media/{}/{}",
            base_url.trim_end_matches('/'),
            BLOGS_DIR,
            file_name
        );
        info!(user = %username, file = %file_name, "📝 Blog post created");

        Ok(BlogPost {
            file_name,
            path,
            url,
        })
    }
}

fn blog_prompt(summary: &str) -> String {
    format!(
        "Create an engaging blog post based on this summary. The blog post should be well-structured with:\n\
         1. An attention-grabbing title\n\
         2. An introduction paragraph\n\
         3. 2-3 main body paragraphs expanding on key points\n\
         4. A conclusion\n\
         5. Include relevant keywords for SEO\n\
         \n\
         Summary to convert to blog post:\n\
         {}\n\
         \n\
         Format the response as a complete HTML blog post with proper heading tags.",
        summary
    )
}

/// `blog_<username>_<8 hex>.html`, with the username reduced to a safe charset
pub fn blog_file_name(username: &str) -> String {
    let safe: String = username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("blog_{}_{}.html", safe, &suffix[..8])
}

/// Minimal HTML escaping for attribute and text positions
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap model output in the standalone blog page
pub fn render_blog_page(
    username: &str,
    blog_content: &str,
    source_url: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let user = escape_html(username);
    let source = escape_html(source_url);
    let date = generated_at.format("%B %d, %Y");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AI Generated Blog - {user}</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            background-color: #f5f5f5;
        }}
        .container {{
            background: white;
            padding: 30px;
            border-radius: 10px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }}
        h1 {{
            color: #2c3e50;
            border-bottom: 3px solid #3498db;
            padding-bottom: 10px;
        }}
        h2 {{
            color: #34495e;
            margin-top: 30px;
        }}
        p {{
            color: #555;
            margin-bottom: 15px;
        }}
        .footer {{
            margin-top: 40px;
            padding-top: 20px;
            border-top: 1px solid #eee;
            color: #777;
            font-size: 0.9em;
            text-align: center;
        }}
        .source {{
            font-style: italic;
            color: #666;
            margin-top: 20px;
        }}
    </style>
</head>
<body>
    <div class="container">
        {blog_content}
        <div class="source">
            <p>Source: <a href="{source}" target="_blank">{source}</a></p>
            <p>Generated by AI Text Summarizer</p>
        </div>
        <div class="footer">
            <p>Generated on {date} by {user}</p>
        </div>
    </div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_blog_file_name_shape() {
        let name = blog_file_name("alice");
        assert!(name.starts_with("blog_alice_"));
        assert!(name.ends_with(".html"));
        // blog_ + alice + _ + 8 hex + .html
        assert_eq!(name.len(), "blog_alice_".len() + 8 + ".html".len());
    }

    #[test]
    fn test_blog_file_name_sanitizes_username() {
        let name = blog_file_name("../evil user");
        assert!(name.starts_with("blog____evil_user_"));
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"https://x.test/?a=1&b="2"<script>"#),
            "https://x.test/?a=1&amp;b=&quot;2&quot;&lt;script&gt;"
        );
    }

    #[test]
    fn test_render_blog_page() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
        let page = render_blog_page("bob", "<h1>Title</h1>", "https://example.com", at);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<h1>Title</h1>"));
        assert!(page.contains(r#"<a href="https://example.com" target="_blank">"#));
        assert!(page.contains("Generated on March 07, 2025 by bob"));
        assert!(page.contains("<title>AI Generated Blog - bob</title>"));
    }

    #[test]
    fn test_blog_prompt_embeds_summary() {
        let prompt = blog_prompt("Rust is fast.");
        assert!(prompt.contains("Summary to convert to blog post:\nRust is fast.\n"));
        assert!(prompt.ends_with("proper heading tags."));
    }
}

//! Constants Module - Single Source of Truth
//!
//! Every default, limit and prompt used across the summarizer lives here.
//! Other modules read these through `AppConfig` instead of hardcoding values.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "AI Text Summarizer";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outbound HTTP requests
pub const USER_AGENT: &str = "AISummarizer/0.1.0";

// ============================================
// ENVIRONMENT KEYS
// ============================================

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_HOST: &str = "SUMMARIZER_HOST";
pub const ENV_PORT: &str = "SUMMARIZER_PORT";
/// Hosting platforms inject PORT; it wins over SUMMARIZER_PORT
pub const ENV_PLATFORM_PORT: &str = "PORT";
pub const ENV_MEDIA_ROOT: &str = "SUMMARIZER_MEDIA_ROOT";
pub const ENV_NEWER_MODELS: &str = "SUMMARIZER_NEWER_MODELS";
pub const ENV_RESTRICTED_TEMP_MODELS: &str = "SUMMARIZER_RESTRICTED_TEMP_MODELS";
pub const ENV_GPT5_NANO_MODELS: &str = "SUMMARIZER_GPT5_NANO_MODELS";
pub const ENV_DEFAULT_TEMPERATURE: &str = "SUMMARIZER_DEFAULT_TEMPERATURE";
pub const ENV_DEFAULT_MAX_TOKENS: &str = "SUMMARIZER_DEFAULT_MAX_TOKENS";
pub const ENV_GPT5_MAX_TOKENS: &str = "SUMMARIZER_GPT5_MAX_TOKENS";
pub const ENV_MAX_TEXT_LENGTH: &str = "SUMMARIZER_MAX_TEXT_LENGTH";
pub const ENV_MAX_URL_CONTENT_LENGTH: &str = "SUMMARIZER_MAX_URL_CONTENT_LENGTH";
pub const ENV_URL_TIMEOUT_SECS: &str = "SUMMARIZER_URL_TIMEOUT_SECS";
pub const ENV_OPENAI_TIMEOUT_SECS: &str = "SUMMARIZER_OPENAI_TIMEOUT_SECS";
pub const ENV_BLOG_MODEL: &str = "SUMMARIZER_BLOG_MODEL";
pub const ENV_RATE_LIMIT: &str = "SUMMARIZER_RATE_LIMIT";
pub const ENV_RATE_WINDOW_SECS: &str = "SUMMARIZER_RATE_WINDOW_SECS";

// ============================================
// SERVER DEFAULTS
// ============================================

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://summarizer.db";
pub const DEFAULT_MEDIA_ROOT: &str = "media";

/// Sub-directory of the media root holding generated blog posts
pub const BLOGS_DIR: &str = "blogs";

/// Requests per rate-limit window
pub const DEFAULT_RATE_LIMIT: u32 = 100;
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 60;

// ============================================
// OPENAI
// ============================================

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_TEMPERATURE: f64 = 0.5;
/// Temperature forced on models that reject anything else
pub const RESTRICTED_TEMPERATURE: f64 = 1.0;
pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const GPT5_MAX_TOKENS: u32 = 300;

/// Models that take `max_completion_tokens` instead of `max_tokens`
pub const NEWER_MODELS: [&str; 5] = [
    "gpt-4o",
    "gpt-4-turbo",
    "gpt-3.5-turbo",
    "gpt-4o-mini",
    "gpt-5-nano",
];
pub const RESTRICTED_TEMP_MODELS: [&str; 1] = ["gpt-5-nano"];
pub const GPT5_NANO_MODELS: [&str; 1] = ["gpt-5-nano"];

// ============================================
// CONTENT LIMITS
// ============================================

/// Maximum characters accepted for direct text summaries
pub const MAX_TEXT_LENGTH: usize = 50_000;
/// Characters of page text kept for URL summaries
pub const MAX_URL_CONTENT_LENGTH: usize = 10_000;
pub const URL_REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================
// PROMPTS
// ============================================

pub const TEXT_SYSTEM_MESSAGE: &str = "You are a helpful assistant that summarizes text.";
pub const URL_SYSTEM_MESSAGE: &str =
    "You are a helpful assistant that summarizes web page content.";
pub const TEXT_PROMPT_PREFIX: &str = "Summarize the following text:\n\n";
pub const URL_PROMPT_PREFIX: &str = "Summarize the following web page content:\n\n";

pub const DEFAULT_BLOG_MODEL: &str = "gpt-3.5-turbo";
pub const BLOG_MAX_TOKENS: u32 = 1000;
pub const BLOG_TEMPERATURE: f64 = 0.7;
pub const BLOG_SYSTEM_MESSAGE: &str =
    "You are a professional blog writer who creates engaging, well-structured blog posts.";

// ============================================
// USER-FACING MESSAGES
// ============================================

pub const MSG_NO_MODELS: &str =
    "No AI models are currently assigned to your account. Please contact an administrator.";
pub const MSG_MODEL_NOT_AVAILABLE: &str = "Selected model is not available for your account.";
pub const MSG_EMPTY_TEXT: &str = "Please enter some text to summarize.";
pub const MSG_EMPTY_URL: &str = "Please enter a valid URL.";
pub const MSG_EMPTY_RESPONSE: &str = "The AI model returned an empty response. Please try again.";
pub const MSG_AI_AUTH: &str =
    "Authentication error with AI service. Please check your API key configuration.";
pub const MSG_AI_RATE_LIMIT: &str = "Rate limit exceeded. Please try again in a few minutes.";
pub const MSG_AI_MODEL_CONFIG: &str = "Model configuration error. Please contact support.";
pub const MSG_AI_CONTEXT_LENGTH: &str =
    "Text is too long for this model. Please try with shorter text.";
pub const MSG_AI_UNAVAILABLE: &str = "AI service temporarily unavailable. Please try again.";
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred. Our team has been notified.";
pub const MSG_NO_SUMMARY: &str = "No summary provided";
pub const MSG_BLOG_CREATED: &str = "Blog post created successfully!";

// ============================================
// PRICE LIST
// ============================================

/// Seed pricing entry (USD per million tokens)
#[derive(Debug, Clone, Copy)]
pub struct ModelPrice {
    pub name: &'static str,
    pub input: &'static str,
    pub cached: Option<&'static str>,
    pub output: Option<&'static str>,
}

const fn price(
    name: &'static str,
    input: &'static str,
    cached: Option<&'static str>,
    output: Option<&'static str>,
) -> ModelPrice {
    ModelPrice {
        name,
        input,
        cached,
        output,
    }
}

/// Price list loaded by `summarizer populate-models`
pub const MODEL_PRICES: [ModelPrice; 41] = [
    price("gpt-5.1", "1.25", Some("0.125"), Some("10.00")),
    price("gpt-5", "1.25", Some("0.125"), Some("10.00")),
    price("gpt-5-mini", "0.25", Some("0.025"), Some("2.00")),
    price("gpt-5-nano", "0.05", Some("0.005"), Some("0.40")),
    price("gpt-5.1-chat-latest", "1.25", Some("0.125"), Some("10.00")),
    price("gpt-5-chat-latest", "1.25", Some("0.125"), Some("10.00")),
    price("gpt-5.1-codex-max", "1.25", Some("0.125"), Some("10.00")),
    price("gpt-5.1-codex", "1.25", Some("0.125"), Some("10.00")),
    price("gpt-5-codex", "1.25", Some("0.125"), Some("10.00")),
    price("gpt-5-pro", "15.00", None, Some("120.00")),
    price("gpt-4.1", "2.00", Some("0.50"), Some("8.00")),
    price("gpt-4.1-mini", "0.40", Some("0.10"), Some("1.60")),
    price("gpt-4.1-nano", "0.10", Some("0.025"), Some("0.40")),
    price("gpt-4o", "2.50", Some("1.25"), Some("10.00")),
    price("gpt-4o-2024-05-13", "5.00", None, Some("15.00")),
    price("gpt-4o-mini", "0.15", Some("0.075"), Some("0.60")),
    price("gpt-realtime", "4.00", Some("0.40"), Some("16.00")),
    price("gpt-realtime-mini", "0.60", Some("0.06"), Some("2.40")),
    price("gpt-4o-realtime-preview", "5.00", Some("2.50"), Some("20.00")),
    price("gpt-4o-mini-realtime-preview", "0.60", Some("0.30"), Some("2.40")),
    price("gpt-audio", "2.50", None, Some("10.00")),
    price("gpt-audio-mini", "0.60", None, Some("2.40")),
    price("gpt-4o-audio-preview", "2.50", None, Some("10.00")),
    price("gpt-4o-mini-audio-preview", "0.15", None, Some("0.60")),
    price("o1", "15.00", Some("7.50"), Some("60.00")),
    price("o1-pro", "150.00", None, Some("600.00")),
    price("o3-pro", "20.00", None, Some("80.00")),
    price("o3", "2.00", Some("0.50"), Some("8.00")),
    price("o3-deep-research", "10.00", Some("2.50"), Some("40.00")),
    price("o4-mini", "1.10", Some("0.275"), Some("4.40")),
    price("o4-mini-deep-research", "2.00", Some("0.50"), Some("8.00")),
    price("o3-mini", "1.10", Some("0.55"), Some("4.40")),
    price("o1-mini", "1.10", Some("0.55"), Some("4.40")),
    price("gpt-5.1-codex-mini", "0.25", Some("0.025"), Some("2.00")),
    price("codex-mini-latest", "1.50", Some("0.375"), Some("6.00")),
    price("gpt-5-search-api", "1.25", Some("0.125"), Some("10.00")),
    price("gpt-4o-mini-search-preview", "0.15", None, Some("0.60")),
    price("gpt-4o-search-preview", "2.50", None, Some("10.00")),
    price("computer-use-preview", "3.00", None, Some("12.00")),
    price("gpt-image-1", "5.00", Some("1.25"), None),
    price("gpt-image-1-mini", "2.00", Some("0.20"), None),
];

/// Parse a comma-separated env list, dropping blanks
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Format an integer with thousands separators (50000 -> "50,000")
pub fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

//! AI Summarizer Library
//!
//! Summarizes text and web pages through the OpenAI chat-completion API,
//! gated by per-user model access grants:
//! - Model-family aware request parameters (token limit key, temperature)
//! - URL fetching and visible-text extraction
//! - Blog post generation from summaries
//! - SQLite storage for users, priced models and grants

pub mod api;
pub mod cli;
pub mod core;
pub mod models;
pub mod providers;
pub mod storage;
pub mod utils;

pub use crate::core::{ApiParams, BlogService, ChatRequest, ContentProcessor, SummaryService, TokenLimit};
pub use models::{AppConfig, AppError, AppResult, ErrorCode, PricedModel, User};
pub use providers::{OpenAiClient, PageFetcher};
pub use storage::Database;

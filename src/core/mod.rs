//! Core Module - Summarization Workflows
//!
//! Parameter selection per model family, content processing, text/URL
//! summaries and blog generation.

pub mod blog;
pub mod content;
pub mod params;
pub mod summarizer;

pub use blog::{BlogPost, BlogService};
pub use content::ContentProcessor;
pub use params::{ApiParams, ChatMessage, ChatRequest, ModelFamilies, Role, TokenLimit};
pub use summarizer::SummaryService;

//! AI Summarizer REST API
//! JSON endpoints for text/URL summaries, profiles and blog generation

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use middleware::{start_cleanup_task, CurrentUser, RateLimitConfig, RateLimiter};
pub use routes::create_router;
pub use types::*;

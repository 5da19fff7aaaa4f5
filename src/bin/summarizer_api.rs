//! AI Summarizer API Server
//!
//! REST API for text and URL summarization with per-user model grants
//!
//! Usage:
//!   cargo run --bin summarizer_api
//!
//! Environment:
//!   PORT / SUMMARIZER_PORT - Server port (default: 8080)
//!   SUMMARIZER_HOST        - Server host (default: 0.0.0.0)
//!   DATABASE_URL           - SQLite database (default: sqlite://summarizer.db)
//!   OPENAI_API_KEY         - OpenAI key used for all completions
//!   RUST_LOG               - Log filter (default: info)

use ai_summarizer::api::{create_router, start_cleanup_task, AppState};
use ai_summarizer::{AppConfig, Database};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let config = AppConfig::from_env()?;
    if config.openai.api_key.is_none() {
        warn!("⚠️  OPENAI_API_KEY not set; summarization requests will fail");
    }

    let db = Database::connect(&config.database_url).await?;
    tokio::fs::create_dir_all(config.blogs_dir()).await?;

    let addr = config.bind_addr()?;
    let state = Arc::new(AppState::new(config, db)?);

    // Background cleanup of stale rate-limit windows
    let cleanup = start_cleanup_task(state.rate_limiter.clone());
    info!("🧹 Background cleanup task started");

    let app = create_router(state.clone());

    info!("🚀 AI Summarizer API starting on http://{}", addr);
    info!("📖 Health: http://{}/v1/health", addr);
    info!("");
    info!("Endpoints:");
    info!("  GET  /v1/summary        - Assigned models for text summaries");
    info!("  POST /v1/summary        - Summarize text");
    info!("  GET  /v1/url-summary    - Assigned models for URL summaries");
    info!("  POST /v1/url-summary    - Summarize a web page");
    info!("  GET  /v1/profile        - Account details and model costs");
    info!("  POST /v1/create-blog    - Turn a summary into a blog post");
    info!("  GET  /media/blogs/...   - Generated blog posts");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("");
    info!("🛑 Shutdown signal received, cleaning up...");
    cleanup.abort();
    state.db.pool().close().await;
    info!("   Uptime: {}s", state.uptime_seconds());
    info!("👋 AI Summarizer API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════════════════╗
    ║                                                          ║
    ║              A I   T E X T   S U M M A R I Z E R         ║
    ║                                                          ║
    ║        Text · URL · Blog    powered by OpenAI            ║
    ║                                                          ║
    ╚══════════════════════════════════════════════════════════╝
    "#
    );
}

//! AI Summarizer management CLI
//!
//! Seeds the price list, manages users, API keys and model grants, and runs
//! the health check. The HTTP server lives in `summarizer_api`.

use ai_summarizer::cli::{self, Cli};
use ai_summarizer::{AppConfig, Database};

use clap::Parser;
use eyre::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let db = Database::connect(&config.database_url).await?;

    let mut stdout = std::io::stdout();
    cli::run(args.command, &config, &db, &mut stdout).await?;

    db.pool().close().await;
    Ok(())
}

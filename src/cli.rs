//! Management commands behind the `summarizer` binary
//!
//! Each command writes its report to `out` so the binary can print to stdout
//! and tests can capture the text.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use crate::models::config::AppConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{model_names, Cost, ModelCosts, NewUser, PricedModel};
use crate::providers::openai::OpenAiClient;
use crate::storage::Database;
use crate::utils::constants::{ModelPrice, APP_NAME, MODEL_PRICES};

#[derive(Parser, Debug)]
#[command(name = "summarizer", version, about = "Management commands for the AI Text Summarizer")]
pub struct Cli {
    /// Log level filter (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Load the built-in OpenAI price list (existing rows are left untouched)
    PopulateModels,
    /// Grant or revoke model access for a user
    AssignModels {
        username: String,
        /// Model names to assign (space-separated)
        #[arg(long, num_args = 1..)]
        models: Vec<String>,
        /// Assign all available models
        #[arg(long)]
        all: bool,
        /// Remove the assignments instead of adding them
        #[arg(long)]
        remove: bool,
    },
    /// Create a user and print its API key
    CreateUser {
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        staff: bool,
        #[arg(long)]
        superuser: bool,
    },
    /// Issue a new API key for a user
    RotateKey { username: String },
    /// Block a user's API key without deleting the account
    DeactivateUser { username: String },
    /// Let a deactivated user's API key in again
    ActivateUser { username: String },
    /// Check configuration, database, OpenAI reachability and grants
    Healthcheck {
        /// Attempt to fix common issues
        #[arg(long)]
        fix: bool,
    },
}

/// Dispatch a parsed command
pub async fn run<W: Write>(
    command: Command,
    config: &AppConfig,
    db: &Database,
    out: &mut W,
) -> AppResult<()> {
    match command {
        Command::PopulateModels => {
            populate_models(db, out).await?;
        }
        Command::AssignModels {
            username,
            models,
            all,
            remove,
        } => assign_models(db, &username, &models, all, remove, out).await?,
        Command::CreateUser {
            username,
            email,
            first_name,
            last_name,
            staff,
            superuser,
        } => {
            let new = NewUser {
                username,
                email,
                first_name,
                last_name,
                is_staff: staff,
                is_superuser: superuser,
            };
            create_user(db, &new, out).await?
        }
        Command::RotateKey { username } => {
            let key = db.rotate_api_key(&username).await?;
            writeln!(out, "New API key for \"{}\": {}", username, key)?;
            writeln!(out, "The previous key no longer works. Store this one now; it is not shown again.")?;
        }
        Command::DeactivateUser { username } => {
            db.set_active(&username, false).await?;
            writeln!(out, "User \"{}\" deactivated", username)?;
        }
        Command::ActivateUser { username } => {
            db.set_active(&username, true).await?;
            writeln!(out, "User \"{}\" activated", username)?;
        }
        Command::Healthcheck { fix } => {
            healthcheck(config, db, fix, out).await?;
        }
    }
    Ok(())
}

fn seed_costs(price: &ModelPrice) -> AppResult<ModelCosts> {
    let parse_opt = |raw: Option<&str>| raw.map(str::parse::<Cost>).transpose();
    Ok(ModelCosts {
        input: price.input.parse()?,
        cached_input: parse_opt(price.cached)?,
        output: parse_opt(price.output)?,
    })
}

/// get-or-create every entry of the price list. Returns how many were new.
pub async fn populate_models<W: Write>(db: &Database, out: &mut W) -> AppResult<usize> {
    let mut created = 0;
    for price in MODEL_PRICES.iter() {
        let (_, was_created) = db.get_or_create_model(price.name, &seed_costs(price)?).await?;
        if was_created {
            created += 1;
        }
    }
    info!("📦 Price list loaded: {} new of {}", created, MODEL_PRICES.len());
    writeln!(out, "Successfully populated OpenAI models")?;
    Ok(created)
}

pub async fn assign_models<W: Write>(
    db: &Database,
    username: &str,
    model_names_arg: &[String],
    all: bool,
    remove: bool,
    out: &mut W,
) -> AppResult<()> {
    let Some(user) = db.get_by_username(username).await? else {
        writeln!(out, "{}", AppError::user_not_found(username).message)?;
        return Ok(());
    };

    let models: Vec<PricedModel> = if all {
        db.list_models().await?
    } else {
        db.find_models_by_names(model_names_arg).await?
    };

    if models.is_empty() {
        writeln!(out, "No models found with the specified names")?;
        return Ok(());
    }

    let action = if remove {
        db.unassign_models(&user, &models).await?;
        "removed from"
    } else {
        db.assign_models(&user, &models).await?;
        "assigned to"
    };
    writeln!(
        out,
        "Successfully {} user \"{}\": {}",
        action,
        username,
        model_names(&models)
    )?;

    let current = db.assigned_models(&user).await?;
    if current.is_empty() {
        writeln!(out, "User has no model assignments")?;
    } else {
        writeln!(out, "Current assignments: {}", model_names(&current))?;
    }
    Ok(())
}

pub async fn create_user<W: Write>(db: &Database, new: &NewUser, out: &mut W) -> AppResult<()> {
    let (user, key) = db.create_user(new).await?;
    writeln!(out, "Created user \"{}\" (id {})", user.username, user.id)?;
    writeln!(out, "API key: {}", key)?;
    writeln!(out, "Store this key now; it is not shown again.")?;
    Ok(())
}

/// Result of a health check run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HealthReport {
    pub issues: Vec<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

pub async fn healthcheck<W: Write>(
    config: &AppConfig,
    db: &Database,
    fix: bool,
    out: &mut W,
) -> AppResult<HealthReport> {
    let mut report = HealthReport::default();

    writeln!(out, "=== {} Health Check ===", APP_NAME)?;

    writeln!(out, "\n1. Checking Environment Configuration...")?;
    let has_key = config.openai.api_key.is_some();
    if has_key {
        writeln!(out, "   ✓ OPENAI_API_KEY configured")?;
    } else {
        report.issues.push("OPENAI_API_KEY not set".to_string());
        writeln!(out, "   ✗ OPENAI_API_KEY not configured")?;
    }

    writeln!(out, "\n2. Checking Database...")?;
    let counts = async { Ok::<_, AppError>((db.count_users().await?, db.count_models().await?)) };
    match counts.await {
        Ok((users, models)) => writeln!(
            out,
            "   ✓ Database accessible ({} users, {} models)",
            users, models
        )?,
        Err(e) => {
            report.issues.push(format!("Database error: {}", e.message));
            writeln!(out, "   ✗ Database error: {}", e.message)?;
        }
    }

    writeln!(out, "\n3. Checking OpenAI API...")?;
    if has_key {
        let listed = match OpenAiClient::new(&config.openai) {
            Ok(client) => client.list_models().await,
            Err(e) => Err(e),
        };
        match listed {
            Ok(_) => writeln!(out, "   ✓ OpenAI API accessible")?,
            Err(e) => {
                report.issues.push(format!("OpenAI API error: {}", e.message));
                writeln!(out, "   ✗ OpenAI API error: {}", e.message)?;
            }
        }
    }

    writeln!(out, "\n4. Checking Model Assignments...")?;
    let idle = db.users_without_models().await?;
    if idle.is_empty() {
        writeln!(out, "   ✓ All users have model assignments")?;
    } else {
        let count = idle.len();
        report
            .issues
            .push(format!("{} users have no model assignments", count));
        writeln!(out, "   ⚠ {} users have no model assignments", count)?;

        if fix {
            if let Some(default_model) = db.first_model().await? {
                for user in &idle {
                    db.assign_models(user, std::slice::from_ref(&default_model))
                        .await?;
                }
                writeln!(
                    out,
                    "   ✓ Fixed: Assigned {} to {} users",
                    default_model.name, count
                )?;
            } else {
                warn!("No models available to assign; run populate-models first");
            }
        }
    }

    writeln!(out, "\n5. Checking Media Directory...")?;
    check_media_dir(&config.media_root, fix, &mut report, out)?;

    writeln!(out, "\n=== Health Check Summary ===")?;
    if report.is_healthy() {
        writeln!(out, "✓ All checks passed! Application is healthy.")?;
    } else {
        writeln!(out, "Found {} issue(s):", report.issues.len())?;
        for issue in &report.issues {
            writeln!(out, "  - {}", issue)?;
        }
        if !fix {
            writeln!(out, "\nRun with --fix to attempt automatic fixes")?;
        }
    }

    Ok(report)
}

fn check_media_dir<W: Write>(
    media_root: &Path,
    fix: bool,
    report: &mut HealthReport,
    out: &mut W,
) -> AppResult<()> {
    if media_root.is_dir() {
        writeln!(out, "   ✓ Media directory exists")?;
        return Ok(());
    }

    report.issues.push("Media directory missing".to_string());
    writeln!(out, "   ✗ Media directory missing ({})", media_root.display())?;
    if fix {
        std::fs::create_dir_all(media_root)?;
        writeln!(out, "   ✓ Fixed: Created media directory")?;
    }
    Ok(())
}

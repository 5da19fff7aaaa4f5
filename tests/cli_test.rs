//! Management command tests against a real (in-memory) database

mod common;

use ai_summarizer::cli::{self, Cli, Command};
use ai_summarizer::models::{AppConfig, NewUser, OpenAiConfig};
use ai_summarizer::Database;
use clap::Parser;
use std::time::Duration;

fn text(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn test_healthcheck_all_green() {
    let (openai_url, _) = common::spawn_openai().await;
    let media = tempfile::tempdir().unwrap();
    let config = AppConfig {
        media_root: media.path().to_path_buf(),
        openai: OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            base_url: openai_url,
            timeout: Duration::from_secs(5),
        },
        ..AppConfig::default()
    };
    let db = Database::in_memory().await.unwrap();

    // a superuser without grants is not an issue
    let mut admin = NewUser::new("admin");
    admin.is_superuser = true;
    db.create_user(&admin).await.unwrap();

    let mut out = Vec::new();
    let report = cli::healthcheck(&config, &db, false, &mut out).await.unwrap();
    let out = text(out);

    assert!(report.is_healthy(), "{out}");
    assert!(out.contains("   ✓ OpenAI API accessible"));
    assert!(out.contains("   ✓ All users have model assignments"));
    assert!(out.ends_with("✓ All checks passed! Application is healthy.\n"));
}

#[tokio::test]
async fn test_healthcheck_reports_without_fixing() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        media_root: dir.path().join("not-there"),
        ..AppConfig::default()
    };
    let db = Database::in_memory().await.unwrap();
    db.create_user(&NewUser::new("solo")).await.unwrap();

    let mut out = Vec::new();
    let report = cli::healthcheck(&config, &db, false, &mut out).await.unwrap();
    let out = text(out);

    assert_eq!(
        report.issues,
        vec![
            "OPENAI_API_KEY not set".to_string(),
            "1 users have no model assignments".to_string(),
            "Media directory missing".to_string(),
        ]
    );
    assert!(out.contains("Found 3 issue(s):"));
    assert!(out.contains("Run with --fix to attempt automatic fixes"));
    assert!(!config.media_root.exists());
}

#[tokio::test]
async fn test_create_user_and_rotate_key_through_dispatch() {
    let db = Database::in_memory().await.unwrap();
    let config = AppConfig::default();

    let cli = Cli::try_parse_from([
        "summarizer",
        "create-user",
        "olga",
        "--email",
        "olga@example.com",
        "--staff",
    ])
    .unwrap();
    let mut out = Vec::new();
    cli::run(cli.command, &config, &db, &mut out).await.unwrap();
    let out = text(out);

    let key = out
        .lines()
        .find_map(|l| l.strip_prefix("API key: "))
        .unwrap()
        .to_string();
    let user = db.authenticate(&key).await.unwrap().unwrap();
    assert_eq!(user.email, "olga@example.com");
    assert!(user.is_staff);
    assert!(!user.is_superuser);

    let mut out = Vec::new();
    cli::run(
        Command::RotateKey {
            username: "olga".into(),
        },
        &config,
        &db,
        &mut out,
    )
    .await
    .unwrap();
    assert!(text(out).starts_with("New API key for \"olga\": sum_"));
    assert!(db.authenticate(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deactivated_user_key_is_rejected() {
    let db = Database::in_memory().await.unwrap();
    let config = AppConfig::default();
    let (_, key) = db.create_user(&NewUser::new("quinn")).await.unwrap();

    let cli = Cli::try_parse_from(["summarizer", "deactivate-user", "quinn"]).unwrap();
    let mut out = Vec::new();
    cli::run(cli.command, &config, &db, &mut out).await.unwrap();
    assert_eq!(text(out), "User \"quinn\" deactivated\n");
    assert!(db.authenticate(&key).await.unwrap().is_none());

    let mut out = Vec::new();
    cli::run(
        Command::ActivateUser {
            username: "quinn".into(),
        },
        &config,
        &db,
        &mut out,
    )
    .await
    .unwrap();
    assert_eq!(text(out), "User \"quinn\" activated\n");
    assert!(db.authenticate(&key).await.unwrap().is_some());

    let err = cli::run(
        Command::DeactivateUser {
            username: "nobody".into(),
        },
        &config,
        &db,
        &mut Vec::<u8>::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.message, "User \"nobody\" does not exist");
}

#[tokio::test]
async fn test_assign_all_models() {
    let db = Database::in_memory().await.unwrap();
    let config = AppConfig::default();
    let mut sink = Vec::new();
    cli::run(Command::PopulateModels, &config, &db, &mut sink)
        .await
        .unwrap();
    let (pat, _) = db.create_user(&NewUser::new("pat")).await.unwrap();

    let cli = Cli::try_parse_from(["summarizer", "assign-models", "pat", "--all"]).unwrap();
    let mut out = Vec::new();
    cli::run(cli.command, &config, &db, &mut out).await.unwrap();

    assert_eq!(db.assigned_models(&pat).await.unwrap().len(), 41);
    assert!(text(out).starts_with("Successfully assigned to user \"pat\": codex-mini-latest, "));
}

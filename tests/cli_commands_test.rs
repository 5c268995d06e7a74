//! End-to-end runs of the CLI command handlers against a temporary store

mod common;

use applog::cli::commands::emit::{self, EmitArgs};
use applog::cli::commands::entries::{self, EntriesArgs};
use applog::cli::commands::{files, sweep};
use applog::domain::models::{EntryQuery, LoggerConfig};
use applog::infrastructure::database::SqliteLogStore;
use applog::LogStore;
use serde_json::json;

use common::temp_db_path;

fn config_for(path: &str) -> LoggerConfig {
    LoggerConfig {
        level: Some("info".to_string()),
        save_to_file: true,
        database_path: path.to_string(),
        interactive: Some(false),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_emit_persists_redacted_entry() {
    let (_dir, path) = temp_db_path();
    let config = config_for(&path);

    emit::execute(
        EmitArgs {
            level: "warn".to_string(),
            source: "Checkout.pay".to_string(),
            message: "retrying payment".to_string(),
            info: Some(r#"{"attempt":2,"apiKey":"k-123"}"#.to_string()),
        },
        &config,
        true,
    )
    .await
    .unwrap();

    let store = SqliteLogStore::open(&path).await.unwrap();
    let records = store.query_entries(&EntryQuery::default()).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, "Checkout.pay");
    assert_eq!(
        records[0].additional_info,
        Some(json!({"attempt": 2, "apiKey": "[REDACTED]"}))
    );
    store.close().await;
}

#[tokio::test]
async fn test_emit_below_level_is_not_persisted() {
    let (_dir, path) = temp_db_path();
    let config = config_for(&path);

    emit::execute(
        EmitArgs {
            level: "debug".to_string(),
            source: "Checkout.pay".to_string(),
            message: "noise".to_string(),
            info: None,
        },
        &config,
        false,
    )
    .await
    .unwrap();

    let store = SqliteLogStore::open(&path).await.unwrap();
    assert!(store.list_files().await.unwrap().is_empty());
    store.close().await;
}

#[tokio::test]
async fn test_emit_rejects_bad_input() {
    let (_dir, path) = temp_db_path();
    let config = config_for(&path);

    let bad_level = EmitArgs {
        level: "loud".to_string(),
        source: "X".to_string(),
        message: "m".to_string(),
        info: None,
    };
    assert!(emit::execute(bad_level, &config, false).await.is_err());

    let bad_info = EmitArgs {
        level: "info".to_string(),
        source: "X".to_string(),
        message: "m".to_string(),
        info: Some("{not json".to_string()),
    };
    assert!(emit::execute(bad_info, &config, false).await.is_err());
}

#[tokio::test]
async fn test_inspection_commands_on_empty_store() {
    let (_dir, path) = temp_db_path();
    let config = config_for(&path);

    files::execute(
        files::FilesArgs {
            command: files::FilesCommands::List,
        },
        &config,
        true,
    )
    .await
    .unwrap();
    entries::execute(EntriesArgs::default(), &config, true)
        .await
        .unwrap();
    sweep::execute(&config, true).await.unwrap();

    let missing = files::execute(
        files::FilesArgs {
            command: files::FilesCommands::Show {
                name: "app_1999-01-01.log".to_string(),
            },
        },
        &config,
        false,
    )
    .await;
    assert!(missing.is_err());
}

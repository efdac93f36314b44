//! Extract and import a miniature release into SQLite
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{sr_archive, SR_RECORDS};
use sqlx::Row;
use sr_import::config::UpdaterConfig;
use sr_import::mapping::MappingCatalog;
use sr_import::storage::SqliteStore;
use sr_import::updater::Updater;
use std::sync::Arc;
use tempfile::TempDir;

async fn updater(dir: &TempDir) -> (Updater, SqliteStore) {
    let store = SqliteStore::open(dir.path().join("sr.db")).await.unwrap();
    store.apply_schema().await.unwrap();

    let config = UpdaterConfig::new()
        .with_data_dir(dir.path())
        .with_chunk_size(1);
    let updater = Updater::new(config, MappingCatalog::bundled().unwrap(), Arc::new(store.clone())).unwrap();

    std::fs::write(&updater.selection().local_archive_file, sr_archive()).unwrap();
    (updater, store)
}

#[tokio::test]
async fn test_extract_and_import_bundled_mapping() {
    let dir = TempDir::new().unwrap();
    let (updater, store) = updater(&dir).await;

    let extracted = updater.extract().await.unwrap();
    assert_eq!(extracted.extracted.len(), 12);

    let summary = updater.import(None).await.unwrap();
    assert!(summary.skipped.is_empty());
    assert_eq!(summary.total_records(), 17);

    let counts = updater.status().await.unwrap();
    let counts: Vec<(&str, u64)> = counts.iter().map(|c| (c.entity_id.as_str(), c.records)).collect();
    assert_eq!(counts, SR_RECORDS.to_vec());

    let row = sqlx::query("SELECT long_desc, refuse, n_factor, com_name FROM foods WHERE ndb_no = '01001'")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(row.get::<String, _>("long_desc"), "Butter, salted");
    assert_eq!(row.get::<i64, _>("refuse"), 0);
    assert_eq!(row.get::<f64, _>("n_factor"), 6.38);
    assert_eq!(row.get::<Option<String>, _>("com_name"), None);

    let row = sqlx::query("SELECT msre_desc, gm_wgt FROM weights ORDER BY id LIMIT 1")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(row.get::<String, _>("msre_desc"), "pat (1\" sq, 1/3\" high)");
    assert_eq!(row.get::<f64, _>("gm_wgt"), 5.0);
}

#[tokio::test]
async fn test_second_extraction_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let (updater, _store) = updater(&dir).await;

    updater.extract().await.unwrap();
    let food = updater.selection().local_extract_dir.join("FOOD_DES.txt");
    let before = std::fs::read(&food).unwrap();

    let again = updater.extract().await.unwrap();
    assert!(again.extracted.is_empty());
    assert_eq!(again.skipped.len(), 12);
    assert_eq!(std::fs::read(&food).unwrap(), before);
}

#[tokio::test]
async fn test_reset_then_reimport() {
    let dir = TempDir::new().unwrap();
    let (updater, _store) = updater(&dir).await;

    updater.extract().await.unwrap();
    updater.import(None).await.unwrap();

    let reset = updater.reset().await.unwrap();
    assert_eq!(reset.total(), 17);
    assert!(updater.status().await.unwrap().iter().all(|c| c.records == 0));

    let summary = updater.import(None).await.unwrap();
    assert_eq!(summary.total_records(), 17);
}

#[tokio::test]
async fn test_import_without_extraction_fails() {
    let dir = TempDir::new().unwrap();
    let (updater, store) = updater(&dir).await;

    assert!(updater.import(None).await.is_err());
    let food_groups = sqlx::query("SELECT COUNT(*) AS n FROM food_groups")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(food_groups.get::<i64, _>("n"), 0);
}

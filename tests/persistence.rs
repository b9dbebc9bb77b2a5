//! Storage round trips through real files: the affirmation database and the
//! JSON client-state blob.

use chrono::NaiveDate;
use materna::content::{AffirmationCategory, AffirmationRepository, SEED_AFFIRMATIONS};
use materna::error::MaternaError;
use materna::notes::{NoteFilter, NoteType};
use materna::store::{AppStore, JsonFileStore, KeyValueStore, Language, STORAGE_KEY};
use std::sync::Arc;
use tempfile::TempDir;

fn database_url(dir: &TempDir) -> String {
    format!("sqlite:{}?mode=rwc", dir.path().join("materna.db").display())
}

#[tokio::test]
async fn seed_set_is_written_once_with_breakdown() {
    let dir = TempDir::new().unwrap();
    let repo = AffirmationRepository::open(&database_url(&dir)).await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 0);

    let inserted = repo.insert_many(&SEED_AFFIRMATIONS).await.unwrap();
    assert_eq!(inserted, 25);
    assert_eq!(repo.count().await.unwrap(), 25);

    let counts = repo.category_counts().await.unwrap();
    assert_eq!(counts[&AffirmationCategory::Confidence], 7);
    assert_eq!(counts[&AffirmationCategory::Strength], 6);
    assert_eq!(counts[&AffirmationCategory::Love], 6);
    assert_eq!(counts[&AffirmationCategory::Peace], 6);

    let reopened = AffirmationRepository::open(&database_url(&dir)).await.unwrap();
    assert_eq!(reopened.count().await.unwrap(), 25);
}

#[tokio::test]
async fn list_filters_by_category_newest_first() {
    let dir = TempDir::new().unwrap();
    let repo = AffirmationRepository::open(&database_url(&dir)).await.unwrap();

    repo.create("First calm thought", AffirmationCategory::Peace)
        .await
        .unwrap();
    repo.create("  Second calm thought  ", AffirmationCategory::Peace)
        .await
        .unwrap();
    repo.create("Strong", AffirmationCategory::Strength)
        .await
        .unwrap();

    let peace = repo.list(Some(AffirmationCategory::Peace)).await.unwrap();
    assert_eq!(peace.len(), 2);
    assert_eq!(peace[0].text, "Second calm thought");
    assert!(peace.iter().all(|a| a.is_active));

    assert_eq!(repo.list(None).await.unwrap().len(), 3);

    let random = repo
        .random(Some(AffirmationCategory::Strength))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(random.text, "Strong");
    assert!(repo.random(Some(AffirmationCategory::Love)).await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_text_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let repo = AffirmationRepository::open(&database_url(&dir)).await.unwrap();

    let too_long = "a".repeat(501);
    let err = repo
        .insert_many(&[
            ("fine", AffirmationCategory::Love),
            (too_long.as_str(), AffirmationCategory::Love),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, MaternaError::Validation(_)));
    assert!(matches!(
        repo.create("   ", AffirmationCategory::Love).await,
        Err(MaternaError::Validation(_))
    ));
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn app_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let conception = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

    {
        let kv = Arc::new(JsonFileStore::new(dir.path()).await.unwrap());
        let store = AppStore::load(kv).await.unwrap();
        store.set_language(Language::Sw).await.unwrap();
        store.set_conception_date(conception, today).await.unwrap();
        let note = store.add_note("Ask about iron", NoteType::Custom).await.unwrap();
        store.toggle_pin_note(&note.id).await.unwrap();
    }

    let kv = Arc::new(JsonFileStore::new(dir.path()).await.unwrap());
    let raw = kv.load(STORAGE_KEY).await.unwrap().unwrap();
    let blob: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(blob["state"]["language"], "sw");
    assert_eq!(blob["state"]["pregnancyData"]["conceptionDate"], "2024-03-09");
    assert_eq!(blob["version"], 0);

    let store = AppStore::load(kv).await.unwrap();
    let state = store.snapshot().await;
    assert_eq!(state.language, Language::Sw);
    let record = state.pregnancy_data.unwrap();
    assert_eq!(record.due_date, NaiveDate::from_ymd_opt(2024, 11, 30).unwrap());
    let notes = store.notes(NoteFilter::All, "iron").await;
    assert_eq!(notes.len(), 1);
    assert!(notes[0].is_pinned);
}

#[tokio::test]
async fn corrupt_blob_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let kv = Arc::new(JsonFileStore::new(dir.path()).await.unwrap());
    kv.save(STORAGE_KEY, "{not json").await.unwrap();

    let store = AppStore::load(kv).await.unwrap();
    let state = store.snapshot().await;
    assert_eq!(state.language, Language::En);
    assert!(state.is_prime);
    assert!(state.saved_notes.is_empty());
}

use anyhow::Result;

use super::HistoryStore;
use super::HISTORY_STORAGE_KEY;
use super::MAX_HISTORY_LENGTH;
use crate::domain::models::KeyValueStore;
use crate::infrastructure::storage::MemoryStore;

fn build_store() -> HistoryStore {
    return HistoryStore::new(Box::<MemoryStore>::default());
}

#[tokio::test]
async fn it_loads_empty_when_nothing_is_stored() {
    let store = build_store();

    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn it_appends_to_the_front() -> Result<()> {
    let store = build_store();

    store.append("a cat").await?;
    let entries = store.append("a dog").await?;

    assert_eq!(entries, vec!["a dog".to_string(), "a cat".to_string()]);
    assert_eq!(store.load().await, entries);
    return Ok(());
}

#[tokio::test]
async fn it_keeps_duplicates_unique_and_in_front() -> Result<()> {
    let store = build_store();

    store.append("a cat").await?;
    let entries = store.append("a cat").await?;

    assert_eq!(entries, vec!["a cat".to_string()]);
    return Ok(());
}

#[tokio::test]
async fn it_moves_reappended_entries_to_the_front() -> Result<()> {
    let store = build_store();

    store.append("c").await?;
    store.append("b").await?;
    store.append("a").await?;
    let entries = store.append("b").await?;

    assert_eq!(
        entries,
        vec!["b".to_string(), "a".to_string(), "c".to_string()]
    );
    return Ok(());
}

#[tokio::test]
async fn it_ignores_empty_and_whitespace_entries() -> Result<()> {
    let store = build_store();

    store.append("a cat").await?;
    assert_eq!(store.append("").await?, vec!["a cat".to_string()]);
    assert_eq!(store.append("   ").await?, vec!["a cat".to_string()]);
    assert_eq!(store.load().await, vec!["a cat".to_string()]);
    return Ok(());
}

#[tokio::test]
async fn it_trims_entries_before_storing() -> Result<()> {
    let store = build_store();

    let entries = store.append("  a cat  ").await?;

    assert_eq!(entries, vec!["a cat".to_string()]);
    return Ok(());
}

#[tokio::test]
async fn it_never_exceeds_the_size_cap() -> Result<()> {
    let store = build_store();

    for idx in 0..(MAX_HISTORY_LENGTH + 10) {
        let entries = store.append(&format!("prompt {idx}")).await?;
        assert!(entries.len() <= MAX_HISTORY_LENGTH);
    }

    assert_eq!(store.load().await.len(), MAX_HISTORY_LENGTH);
    return Ok(());
}

#[tokio::test]
async fn it_evicts_the_oldest_entry_at_the_cap() -> Result<()> {
    let store = build_store();

    for idx in 0..MAX_HISTORY_LENGTH {
        store.append(&format!("prompt {idx}")).await?;
    }

    let entries = store.append("new").await?;

    assert_eq!(entries.len(), MAX_HISTORY_LENGTH);
    assert_eq!(entries[0], "new");
    assert!(!entries.contains(&"prompt 0".to_string()));
    assert!(entries.contains(&"prompt 1".to_string()));
    return Ok(());
}

#[tokio::test]
async fn it_loads_empty_after_clear() -> Result<()> {
    let store = build_store();

    store.append("a cat").await?;
    store.clear().await?;

    assert!(store.load().await.is_empty());
    return Ok(());
}

#[tokio::test]
async fn it_round_trips_through_storage() -> Result<()> {
    let storage = MemoryStore::default();
    let store = HistoryStore::new(Box::new(storage));

    store.append("c").await?;
    store.append("b").await?;
    store.append("a").await?;

    assert_eq!(
        store.load().await,
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
    return Ok(());
}

#[tokio::test]
async fn it_recovers_from_a_corrupt_blob() -> Result<()> {
    let storage = MemoryStore::default();
    storage.set(HISTORY_STORAGE_KEY, "{not json").await?;
    let store = HistoryStore::new(Box::new(storage));

    assert!(store.load().await.is_empty());

    // A subsequent append replaces the corrupt blob entirely.
    let entries = store.append("a cat").await?;
    assert_eq!(entries, vec!["a cat".to_string()]);
    return Ok(());
}

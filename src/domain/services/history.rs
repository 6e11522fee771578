#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::domain::models::ErrorKind;
use crate::domain::models::KeyValueStoreBox;

pub const MAX_HISTORY_LENGTH: usize = 50;

const HISTORY_STORAGE_KEY: &str = "prompt-history";

/// Persisted record of previously submitted prompts, most recent first.
/// Entries are unique, and the list never grows past `MAX_HISTORY_LENGTH`.
pub struct HistoryStore {
    // Held across each full read-modify-write so interleaved calls resolve
    // in issuance order. A clear followed by a load never returns stale data.
    storage: Mutex<KeyValueStoreBox>,
}

impl HistoryStore {
    pub fn new(storage: KeyValueStoreBox) -> HistoryStore {
        return HistoryStore {
            storage: Mutex::new(storage),
        };
    }

    async fn read_entries(storage: &KeyValueStoreBox) -> Vec<String> {
        let blob = match storage.get(HISTORY_STORAGE_KEY).await {
            Ok(blob) => blob,
            Err(err) => {
                tracing::warn!(
                    error = ?err,
                    kind = ErrorKind::Transport.title(),
                    "failed to read history, defaulting to empty"
                );
                return vec![];
            }
        };

        if blob.is_none() {
            return vec![];
        }

        match serde_json::from_str::<Vec<String>>(&blob.unwrap()) {
            Ok(entries) => return entries,
            Err(err) => {
                tracing::warn!(
                    error = ?err,
                    kind = ErrorKind::CorruptState.title(),
                    "history blob is corrupt, resetting to empty"
                );
                return vec![];
            }
        }
    }

    /// Returns all stored prompts. A missing blob is an empty history, and a
    /// corrupt or unreadable one recovers to empty rather than failing the
    /// caller.
    pub async fn load(&self) -> Vec<String> {
        let storage = self.storage.lock().await;
        return HistoryStore::read_entries(&storage).await;
    }

    /// Moves `entry` to the front, dropping any previous duplicate and
    /// evicting the oldest entries past the cap. Empty or whitespace-only
    /// entries are ignored. Returns the new sequence for immediate display.
    pub async fn append(&self, entry: &str) -> Result<Vec<String>> {
        let storage = self.storage.lock().await;
        let mut entries = HistoryStore::read_entries(&storage).await;

        let trimmed = entry.trim();
        if trimmed.is_empty() {
            return Ok(entries);
        }

        entries.retain(|e| return e.as_str() != trimmed);
        entries.insert(0, trimmed.to_string());
        entries.truncate(MAX_HISTORY_LENGTH);

        let payload = serde_json::to_string(&entries)?;
        storage.set(HISTORY_STORAGE_KEY, &payload).await?;

        return Ok(entries);
    }

    /// Deletes the persisted history entirely. Irreversible.
    pub async fn clear(&self) -> Result<()> {
        let storage = self.storage.lock().await;
        storage.remove(HISTORY_STORAGE_KEY).await?;
        return Ok(());
    }
}

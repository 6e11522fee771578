use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::models::KeyValueStore;

/// In-memory key-value store. Stands in for [`super::DiskStore`] in tests.
#[derive(Default)]
pub struct MemoryStore {
    data: DashMap<String, String>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(value) = self.data.get(key) {
            return Ok(Some(value.to_string()));
        }

        return Ok(None);
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.insert(key.to_string(), value.to_string());
        return Ok(());
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.data.remove(key);
        return Ok(());
    }
}

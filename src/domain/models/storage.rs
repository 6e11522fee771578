use anyhow::Result;
use async_trait::async_trait;

/// Durable key-value persistence port. Keys are plain strings, values are
/// opaque string blobs that survive process restarts.
#[async_trait]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes must be atomic from a reader's perspective. A concurrent `get`
    /// observes either the previous value or the new one, never a partial
    /// write.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

pub type KeyValueStoreBox = Box<dyn KeyValueStore + Send + Sync>;

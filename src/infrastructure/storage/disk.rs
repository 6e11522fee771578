#[cfg(test)]
#[path = "disk_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::models::KeyValueStore;

/// File-backed key-value store, one `{key}.json` file per key under the
/// cache directory.
pub struct DiskStore {
    pub data_dir: path::PathBuf,
}

impl Default for DiskStore {
    fn default() -> DiskStore {
        let data_dir = dirs::cache_dir().unwrap().join("easel/storage");

        return DiskStore::new(data_dir);
    }
}

impl DiskStore {
    pub fn new(data_dir: path::PathBuf) -> DiskStore {
        return DiskStore { data_dir };
    }

    fn get_file_path(&self, key: &str) -> path::PathBuf {
        return self.data_dir.join(format!("{key}.json"));
    }
}

#[async_trait]
impl KeyValueStore for DiskStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.get_file_path(key);
        if !file_path.exists() {
            return Ok(None);
        }

        let payload = fs::read_to_string(file_path).await?;
        return Ok(Some(payload));
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir).await?;
        }

        // Write to a temp file and rename so a reader never observes a
        // partially written value.
        let tmp_path = self.data_dir.join(format!("{key}.json.tmp"));
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(value.as_bytes()).await?;
        file.flush().await?;
        fs::rename(tmp_path, self.get_file_path(key)).await?;

        return Ok(());
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let file_path = self.get_file_path(key);
        if !file_path.exists() {
            return Ok(());
        }

        fs::remove_file(file_path).await?;
        return Ok(());
    }
}

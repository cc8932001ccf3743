//! Local key-value storage
//!
//! Persists application state as namespaced JSON files, one file per key.
//! Writes go to a temp file first and are renamed into place (atomic write).
//! Every successful write broadcasts the changed key, so other handles of
//! the same store can reload; this stands in for cross-context storage
//! change events.

use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::broadcast;

/// Namespaced JSON key-value store
#[derive(Clone)]
pub struct LocalStore {
    root: PathBuf,
    changes: broadcast::Sender<String>,
}

impl LocalStore {
    /// Create a store rooted at the given directory
    pub fn new(root: PathBuf) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self { root, changes }
    }

    /// Initialize the store (create directory if needed)
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Local store initialized at: {:?}", self.root);
        Ok(())
    }

    /// Subscribe to change notifications for keys written through any clone
    /// of this store
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }

    /// Read the raw value stored under a key
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).await?;
        Ok(Some(content))
    }

    /// Write the raw value for a key (atomic temp-file + rename)
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value).await?;
        fs::rename(&temp_path, &path).await?;

        tracing::debug!("Stored {} ({} bytes)", key, value.len());
        let _ = self.changes.send(key.to_string());
        Ok(())
    }

    /// Remove a key; absent keys are not an error
    pub async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path).await?;
            tracing::debug!("Removed {}", key);
            let _ = self.changes.send(key.to_string());
        }
        Ok(())
    }

    /// Deserialize the JSON value stored under a key
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize a value to JSON and store it under a key
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw).await
    }

    /// Map a namespaced key to its backing file
    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.root.join(format!("{}.json", name))
    }

    /// Get the store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (LocalStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new(temp_dir.path().join("storage"));
        store.initialize().await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let (store, _temp) = create_test_store().await;

        assert_eq!(store.get("notes-app/theme").await.unwrap(), None);

        store.set("notes-app/theme", "dark").await.unwrap();
        assert_eq!(
            store.get("notes-app/theme").await.unwrap(),
            Some("dark".to_string())
        );

        store.set("notes-app/theme", "light").await.unwrap();
        assert_eq!(
            store.get("notes-app/theme").await.unwrap(),
            Some("light".to_string())
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let (store, _temp) = create_test_store().await;

        store.set("accessToken", "abc").await.unwrap();
        store.remove("accessToken").await.unwrap();
        assert_eq!(store.get("accessToken").await.unwrap(), None);

        // removing an absent key is fine
        store.remove("accessToken").await.unwrap();
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let (store, _temp) = create_test_store().await;

        let value = vec!["a".to_string(), "b".to_string()];
        store.set_json("notes-app/v1", &value).await.unwrap();

        let loaded: Vec<String> = store.get_json("notes-app/v1").await.unwrap().unwrap();
        assert_eq!(loaded, value);
    }

    #[tokio::test]
    async fn test_malformed_json_is_an_error() {
        let (store, _temp) = create_test_store().await;

        store.set("notes-app/v1", "{not json").await.unwrap();
        let result = store.get_json::<Vec<String>>("notes-app/v1").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_changes_are_broadcast_to_other_handles() {
        let (store, _temp) = create_test_store().await;

        let other = store.clone();
        let mut changes = other.subscribe();

        store.set("notes-app/v1", "[]").await.unwrap();

        let key = changes.recv().await.unwrap();
        assert_eq!(key, "notes-app/v1");
    }

    #[tokio::test]
    async fn test_keys_map_to_distinct_files() {
        let (store, _temp) = create_test_store().await;

        store.set("notes-app/v1", "a").await.unwrap();
        store.set("notes-app/seeded", "b").await.unwrap();

        assert_eq!(store.get("notes-app/v1").await.unwrap().unwrap(), "a");
        assert_eq!(store.get("notes-app/seeded").await.unwrap().unwrap(), "b");
    }
}

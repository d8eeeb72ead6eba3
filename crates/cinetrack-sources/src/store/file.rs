use super::memory::{MemoryStore, Snapshot};
use super::{CollectionPath, Document, DocumentStore};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Memory store persisted as one pretty-printed JSON file.
///
/// The whole snapshot is rewritten after each mutation. Writes are
/// serialized so the file never lags behind a later in-process write, and
/// a write whose file could not be saved is rolled back in memory.
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let snapshot = load_snapshot(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryStore::from_snapshot(snapshot),
            write_lock: Mutex::new(()),
        })
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let snapshot = self.inner.snapshot().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&snapshot)?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Store saved to {:?} ({} collections)", self.path, snapshot.len());
        Ok(())
    }

    /// Save the mutated snapshot, or put `before` back when saving fails
    async fn commit(&self, before: Snapshot) -> Result<(), StoreError> {
        if let Err(e) = self.persist().await {
            warn!("Failed to save store to {:?}, discarding the write: {}", self.path, e);
            self.inner.restore(before).await;
            return Err(e);
        }
        Ok(())
    }
}

fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
    if !path.exists() {
        debug!("Store file {:?} does not exist, starting empty", path);
        return Ok(Snapshot::new());
    }

    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Snapshot>(&content) {
        Ok(snapshot) => {
            info!("Loaded store from {:?} ({} collections)", path, snapshot.len());
            Ok(snapshot)
        }
        Err(e) => {
            let backup_path = path.with_extension("json.bak");
            if let Err(backup_err) = std::fs::copy(path, &backup_path) {
                warn!("Store file {:?} is corrupted ({}) and could not be backed up: {}", path, e, backup_err);
            } else {
                warn!("Store file {:?} is corrupted ({}). Backed up to {:?}, starting empty.", path, e, backup_path);
            }
            Ok(Snapshot::new())
        }
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    fn store_name(&self) -> &str {
        "file"
    }

    fn generate_id(&self) -> String {
        self.inner.generate_id()
    }

    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        self.inner.list(collection).await
    }

    async fn query_eq(&self, collection: &CollectionPath, field: &str, value: &Value) -> Result<Vec<Document>, StoreError> {
        self.inner.query_eq(collection, field, value).await
    }

    async fn insert(&self, collection: &CollectionPath, data: Value) -> Result<String, StoreError> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot().await;
        let id = self.inner.insert(collection, data).await?;
        self.commit(before).await?;
        Ok(id)
    }

    async fn set(&self, collection: &CollectionPath, id: &str, data: Value) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot().await;
        self.inner.set(collection, id, data).await?;
        self.commit(before).await
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot().await;
        self.inner.delete(collection, id).await?;
        self.commit(before).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("store.json");
        let movies = CollectionPath::user("u1", "externalMovies");

        let store = JsonFileStore::open(&path).unwrap();
        store.set(&movies, "external-1", json!({"title": "X"})).await.unwrap();
        let id = store.insert(&movies, json!({"title": "Y"})).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        let docs = reopened.list(&movies).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(reopened.get(&movies, &id).await.unwrap().unwrap().data["title"], "Y");
    }

    #[tokio::test]
    async fn test_corrupted_file_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.list(&CollectionPath::root("comments")).await.unwrap().is_empty());
        assert!(path.with_extension("json.bak").exists());
    }

    #[tokio::test]
    async fn test_failed_save_discards_the_write() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let movies = CollectionPath::user("u1", "externalMovies");

        // The parent of the store file is a regular file, so every save fails
        let store = JsonFileStore::open(&blocker.join("store.json")).unwrap();
        assert!(store.set(&movies, "external-1", json!({"title": "X"})).await.is_err());
        assert!(store.get(&movies, "external-1").await.unwrap().is_none());

        assert!(store.insert(&movies, json!({"title": "Y"})).await.is_err());
        assert!(store.list(&movies).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("store.json");
        let movies = CollectionPath::user("u1", "externalMovies");

        let store = JsonFileStore::open(&path).unwrap();
        store.set(&movies, "external-1", json!({"title": "X"})).await.unwrap();

        // Replace the data directory with a file so the next save fails
        std::fs::remove_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data"), "").unwrap();

        assert!(store.delete(&movies, "external-1").await.is_err());
        assert!(store.get(&movies, "external-1").await.unwrap().is_some());
    }
}

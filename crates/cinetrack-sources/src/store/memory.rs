use super::{expect_object, CollectionPath, Document, DocumentStore};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

/// collection path -> document id -> body
pub type Snapshot = BTreeMap<String, BTreeMap<String, Value>>;

/// Process-local store. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            collections: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.collections.read().await.clone()
    }

    /// Replace every collection with `snapshot`
    pub async fn restore(&self, snapshot: Snapshot) {
        *self.collections.write().await = snapshot;
    }

    pub async fn document_count(&self) -> usize {
        self.collections.read().await.values().map(|c| c.len()).sum()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn store_name(&self) -> &str {
        "memory"
    }

    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection.as_str())
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection.as_str())
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_eq(&self, collection: &CollectionPath, field: &str, value: &Value) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let matches: Vec<Document> = collections
            .get(collection.as_str())
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| data.get(field) == Some(value))
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default();
        debug!("memory query {} where {} == {}: {} match(es)", collection, field, value, matches.len());
        Ok(matches)
    }

    async fn insert(&self, collection: &CollectionPath, data: Value) -> Result<String, StoreError> {
        let body = expect_object(data)?;
        let id = self.generate_id();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.as_str().to_string())
            .or_default()
            .insert(id.clone(), Value::Object(body));
        Ok(id)
    }

    async fn set(&self, collection: &CollectionPath, id: &str, data: Value) -> Result<(), StoreError> {
        let body = expect_object(data)?;
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.as_str().to_string())
            .or_default()
            .insert(id.to_string(), Value::Object(body));
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection.as_str()) {
            docs.remove(id);
            if docs.is_empty() {
                collections.remove(collection.as_str());
            }
        }
        Ok(())
    }
}

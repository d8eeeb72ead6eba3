//! Schemaless document storage.
//!
//! Collections are addressed by slash-separated paths such as
//! `users/{uid}/reviews`. Every backend stores JSON objects keyed by
//! document id; the id itself is not part of the stored body.

pub mod file;
pub mod firestore;
pub mod memory;
pub mod value_codec;

pub use file::JsonFileStore;
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Top-level collection
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Collection owned by a user: `users/{uid}/{name}`
    pub fn user(uid: &str, name: &str) -> Self {
        Self(format!("users/{}/{}", uid, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment (the collection id)
    pub fn collection_id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Document path that owns this collection, if nested
    pub fn parent_document(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(parent, _)| parent)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self { id: id.into(), data }
    }

    /// Deserialize into a model, injecting the document id as `id`
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut data = self.data.clone();
        match data.as_object_mut() {
            Some(map) => {
                map.insert("id".to_string(), Value::String(self.id.clone()));
            }
            None => {
                return Err(StoreError::Malformed(format!("document {} is not an object", self.id)));
            }
        }
        Ok(serde_json::from_value(data)?)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn store_name(&self) -> &str;

    /// Fresh document id, unique within the store
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Document>, StoreError>;

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError>;

    /// Documents whose top-level `field` equals `value`
    async fn query_eq(&self, collection: &CollectionPath, field: &str, value: &Value) -> Result<Vec<Document>, StoreError>;

    /// Insert with a store-assigned id; returns the id
    async fn insert(&self, collection: &CollectionPath, data: Value) -> Result<String, StoreError>;

    /// Create or overwrite the document at `id`
    async fn set(&self, collection: &CollectionPath, id: &str, data: Value) -> Result<(), StoreError>;

    /// Remove a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError>;
}

pub(crate) fn expect_object(value: Value) -> Result<serde_json::Map<String, Value>, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Malformed(format!("expected a JSON object, got {}", other))),
    }
}

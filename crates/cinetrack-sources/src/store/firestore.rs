use super::value_codec::{decode_fields, encode_fields, encode_value};
use super::{expect_object, CollectionPath, Document, DocumentStore};
use crate::error::StoreError;
use crate::http::error_text;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

const PAGE_SIZE: u32 = 300;

/// Firestore REST v1 backend, authorized with the signed-in user's id token
pub struct FirestoreStore {
    client: Arc<Client>,
    documents_url: String,
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Value>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryRow {
    document: Option<Value>,
}

impl FirestoreStore {
    pub fn new(client: Arc<Client>, firestore_url: &str, project_id: &str) -> Self {
        Self {
            client,
            documents_url: format!(
                "{}/projects/{}/databases/(default)/documents",
                firestore_url.trim_end_matches('/'),
                project_id
            ),
            id_token: None,
        }
    }

    pub fn with_id_token(self, token: impl Into<String>) -> Self {
        Self {
            id_token: Some(token.into()),
            ..self
        }
    }

    fn collection_url(&self, collection: &CollectionPath) -> String {
        format!("{}/{}", self.documents_url, collection)
    }

    fn document_url(&self, collection: &CollectionPath, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, urlencoding::encode(id))
    }

    fn run_query_url(&self, collection: &CollectionPath) -> String {
        match collection.parent_document() {
            Some(parent) => format!("{}/{}:runQuery", self.documents_url, parent),
            None => format!("{}:runQuery", self.documents_url),
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.id_token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = self.authorized(builder).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        let (status, message) = error_text(response).await;
        if status == StatusCode::UNAUTHORIZED.as_u16() || status == StatusCode::FORBIDDEN.as_u16() {
            return Err(StoreError::Unauthorized(message));
        }
        Err(StoreError::Remote { status, message })
    }
}

/// Body for a single-field equality query against one collection
pub fn build_equality_query(collection_id: &str, field: &str, value: &Value) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection_id }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": encode_value(value)
                }
            }
        }
    })
}

/// Convert a REST document resource into a `Document`
pub fn document_from_rest(resource: &Value) -> Result<Document, StoreError> {
    let name = resource
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| StoreError::Malformed("document without name".to_string()))?;
    let id = name.rsplit('/').next().unwrap_or(name);
    let data = match resource.get("fields").and_then(|f| f.as_object()) {
        Some(fields) => decode_fields(fields)?,
        None => Map::new(),
    };
    Ok(Document::new(id, Value::Object(data)))
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn store_name(&self) -> &str {
        "firestore"
    }

    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(collection, id);
        match self.send(self.client.get(&url)).await {
            Ok(response) => {
                let resource: Value = response.json().await?;
                Ok(Some(document_from_rest(&resource)?))
            }
            Err(StoreError::Remote { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let page: ListResponse = self.send(request).await?.json().await?;
            for resource in &page.documents {
                documents.push(document_from_rest(resource)?);
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Firestore list {}: {} document(s)", collection, documents.len());
        Ok(documents)
    }

    async fn query_eq(&self, collection: &CollectionPath, field: &str, value: &Value) -> Result<Vec<Document>, StoreError> {
        let body = build_equality_query(collection.collection_id(), field, value);
        let request = self.client.post(self.run_query_url(collection)).json(&body);
        let rows: Vec<RunQueryRow> = self.send(request).await?.json().await?;

        // Rows without `document` only carry read metadata
        rows.iter()
            .filter_map(|row| row.document.as_ref())
            .map(document_from_rest)
            .collect()
    }

    async fn insert(&self, collection: &CollectionPath, data: Value) -> Result<String, StoreError> {
        let body = json!({ "fields": encode_fields(&expect_object(data)?) });
        let request = self.client.post(self.collection_url(collection)).json(&body);
        let resource: Value = self.send(request).await?.json().await?;
        let document = document_from_rest(&resource)?;
        info!("Firestore created {}/{}", collection, document.id);
        Ok(document.id)
    }

    async fn set(&self, collection: &CollectionPath, id: &str, data: Value) -> Result<(), StoreError> {
        // PATCH without an update mask replaces the whole document
        let body = json!({ "fields": encode_fields(&expect_object(data)?) });
        let request = self.client.patch(self.document_url(collection, id)).json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
        let request = self.client.delete(self.document_url(collection, id));
        match self.send(request).await {
            Ok(_) | Err(StoreError::Remote { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FirestoreStore {
        FirestoreStore::new(Arc::new(Client::new()), "https://firestore.googleapis.com/v1/", "movies-app")
    }

    #[test]
    fn test_urls() {
        let store = store();
        let reviews = CollectionPath::user("u1", "reviews");
        assert_eq!(
            store.document_url(&reviews, "r 1"),
            "https://firestore.googleapis.com/v1/projects/movies-app/databases/(default)/documents/users/u1/reviews/r%201"
        );
        assert_eq!(
            store.run_query_url(&reviews),
            "https://firestore.googleapis.com/v1/projects/movies-app/databases/(default)/documents/users/u1:runQuery"
        );
        assert_eq!(
            store.run_query_url(&CollectionPath::root("comments")),
            "https://firestore.googleapis.com/v1/projects/movies-app/databases/(default)/documents:runQuery"
        );
    }

    #[test]
    fn test_equality_query_body() {
        let body = build_equality_query("reviews", "movieId", &json!("550"));
        let filter = &body["structuredQuery"]["where"]["fieldFilter"];
        assert_eq!(body["structuredQuery"]["from"][0]["collectionId"], "reviews");
        assert_eq!(filter["field"]["fieldPath"], "movieId");
        assert_eq!(filter["op"], "EQUAL");
        assert_eq!(filter["value"], json!({"stringValue": "550"}));
    }

    #[test]
    fn test_document_from_rest() {
        let resource = json!({
            "name": "projects/p/databases/(default)/documents/users/u1/reviews/abc",
            "fields": {"movieId": {"stringValue": "550"}, "reviewType": {"stringValue": "like"}},
            "createTime": "2024-05-01T10:00:00Z"
        });
        let doc = document_from_rest(&resource).unwrap();
        assert_eq!(doc.id, "abc");
        assert_eq!(doc.data, json!({"movieId": "550", "reviewType": "like"}));

        let empty = document_from_rest(&json!({"name": "x/y/z"})).unwrap();
        assert_eq!(empty.data, json!({}));
        assert!(document_from_rest(&json!({})).is_err());
    }
}

use crate::error::{ServiceError, ServiceResult};
use crate::{parse_document, parse_documents};
use cinetrack_models::{Tag, TagUpdate};
use cinetrack_sources::{CollectionPath, DocumentStore};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

const COLLECTION: &str = "tags";

/// Viewing-status tags. Ids are store-generated; a tag is found by its
/// (user, movie) pair.
#[derive(Clone)]
pub struct TagService {
    store: Arc<dyn DocumentStore>,
    uid: String,
    collection: CollectionPath,
    upsert_lock: Arc<Mutex<()>>,
}

impl TagService {
    pub fn new(store: Arc<dyn DocumentStore>, uid: &str) -> Self {
        Self {
            store,
            uid: uid.to_string(),
            collection: CollectionPath::user(uid, COLLECTION),
            upsert_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Merge `update` into the tag for `movie_id`, creating it on first use.
    /// Fields left as `None` keep their stored value.
    pub async fn add_tag(&self, movie_id: &str, update: TagUpdate) -> ServiceResult<Tag> {
        if movie_id.trim().is_empty() {
            return Err(ServiceError::Validation("A tag needs a movie id".to_string()));
        }
        if update.is_empty() {
            return Err(ServiceError::Validation("Nothing to tag: set watched, interest or rewatch".to_string()));
        }

        let _guard = self.upsert_lock.lock().await;

        if let Some(mut tag) = self.get_tag(movie_id).await? {
            update.apply(&mut tag);
            self.store.set(&self.collection, &tag.id, tag.to_document()).await?;
            info!("Updated tag {} for movie {}", tag.id, movie_id);
            return Ok(tag);
        }

        let mut tag = Tag::new(String::new(), self.uid.clone(), movie_id.to_string());
        update.apply(&mut tag);
        tag.id = self.store.insert(&self.collection, tag.to_document()).await?;
        info!("Created tag {} for movie {}", tag.id, movie_id);
        Ok(tag)
    }

    pub async fn get_tag(&self, movie_id: &str) -> ServiceResult<Option<Tag>> {
        let documents = self
            .store
            .query_eq(&self.collection, "movieId", &json!(movie_id))
            .await?;
        let tags: Vec<Tag> = parse_documents(&documents, "tag");
        Ok(tags.into_iter().find(|t| t.user_id == self.uid))
    }

    pub async fn get_user_tags(&self) -> ServiceResult<Vec<Tag>> {
        let documents = self.store.list(&self.collection).await?;
        let tags: Vec<Tag> = parse_documents(&documents, "tag");
        debug!("Loaded {} tag(s)", tags.len());
        Ok(tags.into_iter().filter(|t| t.user_id == self.uid).collect())
    }

    pub async fn update_tag(&self, id: &str, update: TagUpdate) -> ServiceResult<Tag> {
        let mut tag = parse_document::<Tag>(self.store.get(&self.collection, id).await?)?
            .ok_or_else(|| ServiceError::not_found("Tag", id))?;
        update.apply(&mut tag);
        self.store.set(&self.collection, id, tag.to_document()).await?;
        info!("Updated tag {}", id);
        Ok(tag)
    }

    pub async fn delete_tag(&self, id: &str) -> ServiceResult<()> {
        self.store.delete(&self.collection, id).await?;
        info!("Deleted tag {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinetrack_models::{Answer, WatchStatus};
    use cinetrack_sources::MemoryStore;

    fn service() -> TagService {
        TagService::new(Arc::new(MemoryStore::new()), "u1")
    }

    #[tokio::test]
    async fn test_add_tag_merges_fields() {
        let tags = service();

        let first = tags
            .add_tag(
                "550",
                TagUpdate {
                    watched: Some(WatchStatus::Watched),
                    ..TagUpdate::default()
                },
            )
            .await
            .unwrap();
        let second = tags
            .add_tag(
                "550",
                TagUpdate {
                    rewatch: Some(Answer::Yes),
                    ..TagUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let stored = tags.get_user_tags().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].watched, Some(WatchStatus::Watched));
        assert_eq!(stored[0].rewatch, Some(Answer::Yes));
        assert_eq!(stored[0].interest, None);
        assert_eq!(stored[0].user_id, "u1");
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let tags = service();
        let err = tags.add_tag("550", TagUpdate::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_by_id() {
        let tags = service();
        let tag = tags
            .add_tag(
                "1",
                TagUpdate {
                    interest: Some(Answer::No),
                    ..TagUpdate::default()
                },
            )
            .await
            .unwrap();

        let updated = tags
            .update_tag(
                &tag.id,
                TagUpdate {
                    interest: Some(Answer::Yes),
                    watched: Some(WatchStatus::Dropped),
                    ..TagUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.interest, Some(Answer::Yes));
        assert_eq!(tags.get_tag("1").await.unwrap().unwrap().watched, Some(WatchStatus::Dropped));

        tags.delete_tag(&tag.id).await.unwrap();
        assert!(tags.get_tag("1").await.unwrap().is_none());
        assert!(matches!(
            tags.update_tag(&tag.id, TagUpdate::default()).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}

use crate::error::{ServiceError, ServiceResult};
use crate::{parse_document, parse_documents};
use chrono::Utc;
use cinetrack_models::Comment;
use cinetrack_sources::{CollectionPath, DocumentStore};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const COLLECTION: &str = "comments";

/// Comments on reviews, kept in the top-level `comments` collection
#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn DocumentStore>,
    uid: String,
    collection: CollectionPath,
}

fn non_blank(content: &str) -> ServiceResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ServiceError::Validation("Comment text cannot be empty".to_string()));
    }
    Ok(content.to_string())
}

impl CommentService {
    pub fn new(store: Arc<dyn DocumentStore>, uid: &str) -> Self {
        Self {
            store,
            uid: uid.to_string(),
            collection: CollectionPath::root(COLLECTION),
        }
    }

    pub async fn add_comment(&self, review_id: &str, content: &str) -> ServiceResult<Comment> {
        let content = non_blank(content)?;
        let mut comment = Comment {
            id: String::new(),
            review_id: review_id.to_string(),
            user_id: self.uid.clone(),
            content,
            created_at: Utc::now(),
            updated_at: None,
        };
        comment.id = self.store.insert(&self.collection, comment.to_document()).await?;
        info!("Added comment {} on review {}", comment.id, review_id);
        Ok(comment)
    }

    /// Oldest first
    pub async fn get_comments_by_review_id(&self, review_id: &str) -> ServiceResult<Vec<Comment>> {
        let documents = self
            .store
            .query_eq(&self.collection, "reviewId", &json!(review_id))
            .await?;
        let mut comments: Vec<Comment> = parse_documents(&documents, "comment");
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn owned(&self, id: &str) -> ServiceResult<Option<Comment>> {
        let comment = parse_document::<Comment>(self.store.get(&self.collection, id).await?)?;
        match comment {
            Some(c) if !c.user_id.is_empty() && c.user_id != self.uid => Err(ServiceError::Forbidden(format!(
                "Comment {} belongs to another user",
                id
            ))),
            other => Ok(other),
        }
    }

    pub async fn update_comment(&self, id: &str, content: &str) -> ServiceResult<Comment> {
        let content = non_blank(content)?;
        let mut comment = self
            .owned(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Comment", id))?;
        comment.content = content;
        comment.updated_at = Some(Utc::now());
        self.store.set(&self.collection, id, comment.to_document()).await?;
        info!("Updated comment {}", id);
        Ok(comment)
    }

    pub async fn delete_comment(&self, id: &str) -> ServiceResult<()> {
        if self.owned(id).await?.is_some() {
            self.store.delete(&self.collection, id).await?;
            info!("Deleted comment {}", id);
        }
        Ok(())
    }

    /// Remove the whole thread of a review; returns how many were removed
    pub async fn delete_comments_by_review_id(&self, review_id: &str) -> ServiceResult<usize> {
        let documents = self
            .store
            .query_eq(&self.collection, "reviewId", &json!(review_id))
            .await?;
        for document in &documents {
            self.store.delete(&self.collection, &document.id).await?;
        }
        Ok(documents.len())
    }
}

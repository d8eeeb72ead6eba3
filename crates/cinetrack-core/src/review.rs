use crate::error::{ServiceError, ServiceResult};
use crate::{parse_document, parse_documents};
use chrono::Utc;
use cinetrack_models::{Review, ReviewStatus, ReviewType};
use cinetrack_sources::{CollectionPath, DocumentStore};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

const COLLECTION: &str = "reviews";

/// Reviews owned by one user, stored at `users/{uid}/reviews`
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn DocumentStore>,
    collection: CollectionPath,
    // Serializes query-then-write upserts issued from this process
    upsert_lock: Arc<Mutex<()>>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn DocumentStore>, uid: &str) -> Self {
        Self {
            store,
            collection: CollectionPath::user(uid, COLLECTION),
            upsert_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create the user's review for `movie_id`, or overwrite the existing one
    pub async fn create_review(
        &self,
        movie_id: &str,
        review_type: ReviewType,
        content: Option<String>,
    ) -> ServiceResult<Review> {
        if movie_id.trim().is_empty() {
            return Err(ServiceError::Validation("A review needs a movie id".to_string()));
        }
        let content = content.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());

        let _guard = self.upsert_lock.lock().await;
        let now = Utc::now();

        if let Some(mut review) = self.get_reviews_by_movie_id(movie_id).await?.into_iter().next() {
            review.review_type = review_type;
            review.content = content;
            review.updated_at = now;
            self.store.set(&self.collection, &review.id, review.to_document()).await?;
            info!("Updated review {} for movie {} ({})", review.id, movie_id, review_type);
            return Ok(review);
        }

        let mut review = Review {
            id: String::new(),
            movie_id: movie_id.to_string(),
            content,
            review_type,
            created_at: now,
            updated_at: now,
        };
        review.id = self.store.insert(&self.collection, review.to_document()).await?;
        info!("Created review {} for movie {} ({})", review.id, movie_id, review_type);
        Ok(review)
    }

    pub async fn get_reviews_by_movie_id(&self, movie_id: &str) -> ServiceResult<Vec<Review>> {
        let documents = self
            .store
            .query_eq(&self.collection, "movieId", &json!(movie_id))
            .await?;
        Ok(parse_documents(&documents, "review"))
    }

    /// Every review of the user, most recently updated first
    pub async fn get_all_user_reviews(&self) -> ServiceResult<Vec<Review>> {
        let documents = self.store.list(&self.collection).await?;
        let mut reviews: Vec<Review> = parse_documents(&documents, "review");
        reviews.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        debug!("Loaded {} review(s)", reviews.len());
        Ok(reviews)
    }

    pub async fn get_review_by_id(&self, id: &str) -> ServiceResult<Option<Review>> {
        let document = self.store.get(&self.collection, id).await?;
        Ok(parse_document(document)?)
    }

    pub async fn delete_review(&self, id: &str) -> ServiceResult<()> {
        self.store.delete(&self.collection, id).await?;
        info!("Deleted review {}", id);
        Ok(())
    }

    /// Remove every review pointing at `movie_id`; returns how many were removed
    pub async fn delete_reviews_by_movie_id(&self, movie_id: &str) -> ServiceResult<usize> {
        let documents = self
            .store
            .query_eq(&self.collection, "movieId", &json!(movie_id))
            .await?;
        for document in &documents {
            self.store.delete(&self.collection, &document.id).await?;
        }
        if !documents.is_empty() {
            info!("Deleted {} review(s) of movie {}", documents.len(), movie_id);
        }
        Ok(documents.len())
    }

    /// Status of the user's own review for one movie
    pub async fn status_for(&self, movie_id: &str) -> ServiceResult<Option<ReviewStatus>> {
        Ok(self
            .get_reviews_by_movie_id(movie_id)
            .await?
            .first()
            .map(|r| ReviewStatus::from(r.review_type)))
    }

    /// movie id -> review status, built from a single listing
    pub async fn status_index(&self) -> ServiceResult<HashMap<String, ReviewStatus>> {
        let documents = self.store.list(&self.collection).await?;
        let reviews: Vec<Review> = parse_documents(&documents, "review");
        let mut index = HashMap::with_capacity(reviews.len());
        for review in reviews {
            index
                .entry(review.movie_id)
                .or_insert_with(|| ReviewStatus::from(review.review_type));
        }
        Ok(index)
    }
}

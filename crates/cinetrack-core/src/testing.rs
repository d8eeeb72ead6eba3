//! Hand-written fakes for the external collaborators.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use cinetrack_models::{Movie, UserProfile};
use cinetrack_sources::{
    AuthError, CatalogError, CollectionPath, Document, DocumentStore, IdentityProvider, MemoryStore, MovieCatalog,
    Session, StoreError,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn catalog_movie(id: &str, title: &str) -> Movie {
    Movie {
        id: id.to_string(),
        title: title.to_string(),
        poster_url: Some(format!("https://image.tmdb.org/t/p/w500/{}.jpg", id)),
        release_year: "2010".to_string(),
        director: String::new(),
        duration: String::new(),
        genre: "Drama".to_string(),
        synopsis: String::new(),
        status: None,
        is_external: false,
        is_tmdb: true,
        external_id: None,
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub popular: Vec<Movie>,
    pub details: HashMap<String, Movie>,
    pub failing: bool,
    pub detail_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_popular(popular: Vec<Movie>) -> Self {
        Self {
            popular,
            ..Self::default()
        }
    }

    pub fn with_details(movies: Vec<Movie>) -> Self {
        Self {
            details: movies.into_iter().map(|m| (m.id.clone(), m)).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), CatalogError> {
        if self.failing {
            return Err(CatalogError::Status {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    fn catalog_name(&self) -> &str {
        "fake"
    }

    async fn popular_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        self.check()?;
        Ok(self.popular.clone())
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        self.check()?;
        let needle = query.to_lowercase();
        Ok(self
            .popular
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn movie_details(&self, id: &str) -> Result<Option<Movie>, CatalogError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.details.get(id).cloned())
    }
}

/// Accepts any password for accounts it has seen at sign-up
#[derive(Default)]
pub struct FakeIdentity {
    pub accounts: Mutex<HashMap<String, String>>,
    pub refreshes: AtomicUsize,
    pub reject_refresh: bool,
}

impl FakeIdentity {
    fn session(email: &str, display_name: Option<&str>) -> Session {
        Session {
            profile: UserProfile {
                uid: format!("uid-{}", email.split('@').next().unwrap_or(email)),
                email: email.to_string(),
                display_name: display_name.map(str::to_string),
                photo_url: None,
            },
            id_token: "token-1".to_string(),
            refresh_token: "refresh-1".to_string(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn sign_up(&self, email: &str, password: &str, display_name: Option<&str>) -> Result<Session, AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::EmailExists);
        }
        accounts.insert(email.to_string(), password.to_string());
        Ok(Self::session(email, display_name))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        match self.accounts.lock().unwrap().get(email) {
            Some(stored) if stored == password => Ok(Self::session(email, None)),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn refresh_session(&self, session: &Session) -> Result<Session, AuthError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.reject_refresh {
            return Err(AuthError::SessionExpired);
        }
        let mut next = session.clone();
        next.id_token = "token-2".to_string();
        next.expires_at = Some(Utc::now() + Duration::hours(1));
        Ok(next)
    }

    async fn update_profile(
        &self,
        session: &Session,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<Session, AuthError> {
        let mut next = session.clone();
        if let Some(name) = display_name {
            next.profile.display_name = Some(name.to_string());
        }
        if let Some(photo) = photo_url {
            next.profile.photo_url = Some(photo.to_string());
        }
        Ok(next)
    }

    async fn update_password(&self, session: &Session, new_password: &str) -> Result<Session, AuthError> {
        self.accounts
            .lock()
            .unwrap()
            .insert(session.profile.email.clone(), new_password.to_string());
        Ok(session.clone())
    }

    async fn delete_account(&self, session: &Session) -> Result<(), AuthError> {
        self.accounts.lock().unwrap().remove(&session.profile.email);
        Ok(())
    }
}

/// Memory store that rejects every operation on the collections marked failing
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<String>>,
}

impl FailingStore {
    /// Fail operations on every collection with this id, e.g. `reviews`
    pub fn fail_collection(&self, collection_id: &str) {
        self.failing.lock().unwrap().insert(collection_id.to_string());
    }

    pub async fn document_count(&self) -> usize {
        self.inner.document_count().await
    }

    fn check(&self, collection: &CollectionPath) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(collection.collection_id()) {
            return Err(StoreError::Remote {
                status: 503,
                message: format!("{} unavailable", collection),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    fn store_name(&self) -> &str {
        "failing"
    }

    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Document>, StoreError> {
        self.check(collection)?;
        self.inner.get(collection, id).await
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        self.check(collection)?;
        self.inner.list(collection).await
    }

    async fn query_eq(&self, collection: &CollectionPath, field: &str, value: &Value) -> Result<Vec<Document>, StoreError> {
        self.check(collection)?;
        self.inner.query_eq(collection, field, value).await
    }

    async fn insert(&self, collection: &CollectionPath, data: Value) -> Result<String, StoreError> {
        self.check(collection)?;
        self.inner.insert(collection, data).await
    }

    async fn set(&self, collection: &CollectionPath, id: &str, data: Value) -> Result<(), StoreError> {
        self.check(collection)?;
        self.inner.set(collection, id, data).await
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
        self.check(collection)?;
        self.inner.delete(collection, id).await
    }
}

use crate::cache::MovieCache;
use crate::comment::CommentService;
use crate::error::{ServiceError, ServiceResult};
use crate::review::ReviewService;
use crate::{parse_document, parse_documents};
use cinetrack_models::{Movie, MovieDraft, MoviePatch, EXTERNAL_ID_PREFIX};
use cinetrack_sources::{CollectionPath, DocumentStore, MovieCatalog};
use std::sync::Arc;
use tracing::{debug, info, warn};

const COLLECTION: &str = "externalMovies";

/// What a movie deletion removed along with the movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovieDeletion {
    pub reviews: usize,
    pub comments: usize,
}

/// Movie lookups for one user.
///
/// Resolution order for a single id: the user's own external movie
/// document, then the catalog cache, then a live catalog fetch (catalog
/// ids only). Every movie handed out carries the user's review status.
#[derive(Clone)]
pub struct MovieService {
    store: Arc<dyn DocumentStore>,
    catalog: Option<Arc<dyn MovieCatalog>>,
    cache: MovieCache,
    reviews: ReviewService,
    comments: CommentService,
    collection: CollectionPath,
}

impl MovieService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        catalog: Option<Arc<dyn MovieCatalog>>,
        cache: MovieCache,
        reviews: ReviewService,
        uid: &str,
    ) -> Self {
        Self {
            comments: CommentService::new(store.clone(), uid),
            store,
            catalog,
            cache,
            reviews,
            collection: CollectionPath::user(uid, COLLECTION),
        }
    }

    pub fn has_catalog(&self) -> bool {
        self.catalog.is_some()
    }

    pub async fn get_movie_by_id(&self, id: &str) -> ServiceResult<Option<Movie>> {
        let Some(movie) = self.resolve(id).await? else {
            debug!("Movie {} did not resolve", id);
            return Ok(None);
        };
        let status = self.reviews.status_for(id).await?;
        Ok(Some(movie.with_status(status)))
    }

    async fn resolve(&self, id: &str) -> ServiceResult<Option<Movie>> {
        if let Some(mut movie) = parse_document::<Movie>(self.store.get(&self.collection, id).await?)? {
            movie.is_external = true;
            return Ok(Some(movie));
        }

        if let Some(movie) = self.cache.get(id).await {
            return Ok(Some(movie));
        }

        if Movie::is_external_id(id) {
            return Ok(None);
        }

        let Some(catalog) = &self.catalog else {
            debug!("No catalog configured, cannot fetch movie {}", id);
            return Ok(None);
        };

        match catalog.movie_details(id).await {
            Ok(Some(movie)) => {
                self.cache.insert(&movie).await;
                Ok(Some(movie))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!("Failed to fetch movie {} from {}: {}", id, catalog.catalog_name(), e);
                Ok(None)
            }
        }
    }

    pub async fn get_popular_movies(&self) -> ServiceResult<Vec<Movie>> {
        let Some(catalog) = &self.catalog else {
            debug!("No catalog configured, no popular movies");
            return Ok(Vec::new());
        };

        let movies = match catalog.popular_movies().await {
            Ok(movies) => movies,
            Err(e) => {
                warn!("Failed to fetch popular movies from {}: {}", catalog.catalog_name(), e);
                return Ok(Vec::new());
            }
        };
        self.cache.insert_many(&movies).await;
        self.with_statuses(movies).await
    }

    pub async fn search_movies(&self, query: &str) -> ServiceResult<Vec<Movie>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let Some(catalog) = &self.catalog else {
            debug!("No catalog configured, search for '{}' skipped", query);
            return Ok(Vec::new());
        };

        let movies = match catalog.search_movies(query).await {
            Ok(movies) => movies,
            Err(e) => {
                warn!("Search for '{}' on {} failed: {}", query, catalog.catalog_name(), e);
                return Ok(Vec::new());
            }
        };
        self.cache.insert_many(&movies).await;
        self.with_statuses(movies).await
    }

    /// All user-entered movies, title order
    pub async fn list_external_movies(&self) -> ServiceResult<Vec<Movie>> {
        let documents = self.store.list(&self.collection).await?;
        let mut movies: Vec<Movie> = parse_documents(&documents, "movie");
        for movie in &mut movies {
            movie.is_external = true;
        }
        movies.sort_by_key(|m| m.title.to_lowercase());
        self.with_statuses(movies).await
    }

    /// Overlay review status using one listing of the user's reviews
    async fn with_statuses(&self, movies: Vec<Movie>) -> ServiceResult<Vec<Movie>> {
        if movies.is_empty() {
            return Ok(movies);
        }
        let index = self.reviews.status_index().await?;
        Ok(movies
            .into_iter()
            .map(|movie| {
                let status = index.get(&movie.id).copied();
                movie.with_status(status)
            })
            .collect())
    }

    pub async fn create_external_movie(&self, draft: MovieDraft) -> ServiceResult<Movie> {
        if draft.title.trim().is_empty() {
            return Err(ServiceError::Validation("A movie needs a title".to_string()));
        }

        let id = format!("{}{}", EXTERNAL_ID_PREFIX, self.store.generate_id());
        let movie = Movie::from_draft(id, draft);
        self.store.set(&self.collection, &movie.id, movie.to_document()).await?;
        info!("Created external movie {} ({})", movie.id, movie.title);
        Ok(movie)
    }

    pub async fn update_movie(&self, id: &str, patch: MoviePatch) -> ServiceResult<Movie> {
        if !Movie::is_external_id(id) {
            return Err(ServiceError::NotExternal(id.to_string()));
        }
        if matches!(patch.title.as_deref(), Some(title) if title.trim().is_empty()) {
            return Err(ServiceError::Validation("A movie needs a title".to_string()));
        }

        let mut movie = parse_document::<Movie>(self.store.get(&self.collection, id).await?)?
            .ok_or_else(|| ServiceError::not_found("Movie", id))?;
        if patch.is_empty() {
            debug!("Empty patch for movie {}", id);
        } else {
            patch.apply(&mut movie);
            movie.is_external = true;
            self.store.set(&self.collection, id, movie.to_document()).await?;
            info!("Updated external movie {}", id);
        }

        let status = self.reviews.status_for(id).await?;
        Ok(movie.with_status(status))
    }

    /// Delete an external movie, then its reviews and their comment threads.
    /// If the cascade fails the movie stays deleted.
    pub async fn delete_movie(&self, id: &str) -> ServiceResult<MovieDeletion> {
        if !Movie::is_external_id(id) {
            return Err(ServiceError::NotExternal(id.to_string()));
        }

        self.store.delete(&self.collection, id).await?;
        self.cache.remove(id).await;
        info!("Deleted external movie {}", id);

        let mut deletion = MovieDeletion::default();
        for review in self.reviews.get_reviews_by_movie_id(id).await? {
            deletion.comments += self.comments.delete_comments_by_review_id(&review.id).await?;
        }
        deletion.reviews = self.reviews.delete_reviews_by_movie_id(id).await?;
        Ok(deletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{catalog_movie, FailingStore, FakeCatalog};
    use cinetrack_models::{ReviewStatus, ReviewType};
    use cinetrack_sources::MemoryStore;
    use std::sync::atomic::Ordering;

    fn setup(catalog: Option<FakeCatalog>) -> (Arc<MemoryStore>, Option<Arc<FakeCatalog>>, MovieService) {
        let store = Arc::new(MemoryStore::new());
        let catalog = catalog.map(Arc::new);
        let reviews = ReviewService::new(store.clone(), "u1");
        let movies = MovieService::new(
            store.clone(),
            catalog.clone().map(|c| c as Arc<dyn MovieCatalog>),
            MovieCache::default(),
            reviews,
            "u1",
        );
        (store, catalog, movies)
    }

    fn draft(title: &str) -> MovieDraft {
        MovieDraft {
            title: title.to_string(),
            director: "Anna Muylaert".to_string(),
            release_year: "2015".to_string(),
            ..MovieDraft::default()
        }
    }

    #[tokio::test]
    async fn test_unknown_catalog_id_resolves_to_none() {
        let (_, catalog, movies) = setup(Some(FakeCatalog::default()));
        assert!(movies.get_movie_by_id("999").await.unwrap().is_none());
        assert_eq!(catalog.unwrap().detail_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_external_id_never_hits_catalog() {
        let (_, catalog, movies) = setup(Some(FakeCatalog::default()));
        assert!(movies.get_movie_by_id("external-missing").await.unwrap().is_none());
        assert_eq!(catalog.unwrap().detail_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_catalog_detail_is_cached_and_overlaid() {
        let (_, catalog, movies) = setup(Some(FakeCatalog::with_details(vec![catalog_movie("550", "Clube da Luta")])));
        movies.reviews.create_review("550", ReviewType::Dislike, None).await.unwrap();

        let first = movies.get_movie_by_id("550").await.unwrap().unwrap();
        let second = movies.get_movie_by_id("550").await.unwrap().unwrap();

        assert_eq!(first.status, Some(ReviewStatus::Dislike));
        assert_eq!(second.title, "Clube da Luta");
        assert_eq!(catalog.unwrap().detail_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_swallowed() {
        let (_, _, movies) = setup(Some(FakeCatalog::failing()));
        assert!(movies.get_movie_by_id("550").await.unwrap().is_none());
        assert!(movies.get_popular_movies().await.unwrap().is_empty());
        assert!(movies.search_movies("matrix").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_popular_overlays_statuses() {
        let popular = vec![catalog_movie("1", "Bacurau"), catalog_movie("2", "Aquarius"), catalog_movie("3", "Cidade de Deus")];
        let (_, _, movies) = setup(Some(FakeCatalog::with_popular(popular)));
        movies.reviews.create_review("1", ReviewType::Like, None).await.unwrap();
        movies.reviews.create_review("3", ReviewType::Favorite, None).await.unwrap();

        let listed = movies.get_popular_movies().await.unwrap();
        let statuses: Vec<_> = listed.iter().map(|m| m.status.map(|s| s.code())).collect();
        assert_eq!(statuses, vec![Some("like2"), None, Some("staro")]);

        // popular results land in the cache
        assert!(movies.cache.get("2").await.is_some());
    }

    #[tokio::test]
    async fn test_blank_search_skips_catalog() {
        let (_, catalog, movies) = setup(Some(FakeCatalog::with_popular(vec![catalog_movie("1", "Bacurau")])));
        assert!(movies.search_movies("   ").await.unwrap().is_empty());
        let catalog = catalog.unwrap();
        assert_eq!(catalog.search_calls.load(Ordering::SeqCst), 0);

        let found = movies.search_movies(" bacu ").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(catalog.queries.lock().unwrap().as_slice(), ["bacu"]);
    }

    #[tokio::test]
    async fn test_create_external_movie_round_trips() {
        let (_, _, movies) = setup(None);
        let created = movies.create_external_movie(draft("Que Horas Ela Volta?")).await.unwrap();

        assert!(created.id.starts_with(EXTERNAL_ID_PREFIX));
        assert!(created.is_external);
        assert!(!created.is_tmdb);

        let loaded = movies.get_movie_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let (_, _, movies) = setup(None);
        let err = movies.create_external_movie(draft("  ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_movie() {
        let (_, _, movies) = setup(None);
        let created = movies.create_external_movie(draft("Rascunho")).await.unwrap();

        let patch = MoviePatch {
            title: Some("Título final".to_string()),
            poster_url: Some(None),
            ..MoviePatch::default()
        };
        let updated = movies.update_movie(&created.id, patch).await.unwrap();
        assert_eq!(updated.title, "Título final");
        assert_eq!(updated.director, "Anna Muylaert");

        let loaded = movies.get_movie_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Título final");
    }

    #[tokio::test]
    async fn test_update_and_delete_reject_catalog_ids() {
        let (_, _, movies) = setup(None);
        assert!(matches!(
            movies.update_movie("550", MoviePatch::default()).await,
            Err(ServiceError::NotExternal(_))
        ));
        assert!(matches!(movies.delete_movie("550").await, Err(ServiceError::NotExternal(_))));
        assert!(matches!(
            movies.update_movie("external-gone", MoviePatch::default()).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_reviews_and_comments() {
        let (store, _, movies) = setup(None);
        let comments = CommentService::new(store.clone(), "u1");
        let created = movies.create_external_movie(draft("Temporário")).await.unwrap();
        let review = movies.reviews.create_review(&created.id, ReviewType::Like, None).await.unwrap();
        let other = movies.reviews.create_review("550", ReviewType::Like, None).await.unwrap();
        comments.add_comment(&review.id, "some").await.unwrap();
        comments.add_comment(&review.id, "junto").await.unwrap();
        comments.add_comment(&other.id, "fica").await.unwrap();

        let deletion = movies.delete_movie(&created.id).await.unwrap();

        assert_eq!(deletion, MovieDeletion { reviews: 1, comments: 2 });
        assert!(movies.get_movie_by_id(&created.id).await.unwrap().is_none());
        assert!(movies.reviews.get_reviews_by_movie_id(&created.id).await.unwrap().is_empty());
        assert!(comments.get_comments_by_review_id(&review.id).await.unwrap().is_empty());
        // the unrelated review and its thread survive
        assert_eq!(comments.get_comments_by_review_id(&other.id).await.unwrap().len(), 1);
        assert_eq!(store.document_count().await, 2);
    }

    #[tokio::test]
    async fn test_failed_cascade_leaves_movie_deleted() {
        let store = Arc::new(FailingStore::default());
        let movies = MovieService::new(
            store.clone(),
            None,
            MovieCache::default(),
            ReviewService::new(store.clone(), "u1"),
            "u1",
        );
        let created = movies.create_external_movie(draft("Órfão")).await.unwrap();
        movies.reviews.create_review(&created.id, ReviewType::Like, None).await.unwrap();

        store.fail_collection("reviews");
        let err = movies.delete_movie(&created.id).await.unwrap_err();

        assert!(matches!(err, ServiceError::Store(_)));
        let external = CollectionPath::user("u1", COLLECTION);
        assert!(store.get(&external, &created.id).await.unwrap().is_none());
        // the review is left behind
        assert_eq!(store.document_count().await, 1);
    }

    #[tokio::test]
    async fn test_list_external_movies_sorted_with_status() {
        let (_, _, movies) = setup(None);
        let b = movies.create_external_movie(draft("beta")).await.unwrap();
        movies.create_external_movie(draft("Alfa")).await.unwrap();
        movies.reviews.create_review(&b.id, ReviewType::Favorite, None).await.unwrap();

        let listed = movies.list_external_movies().await.unwrap();
        assert_eq!(listed.iter().map(|m| m.title.as_str()).collect::<Vec<_>>(), vec!["Alfa", "beta"]);
        assert_eq!(listed[1].status, Some(ReviewStatus::Favorite));
    }

    #[tokio::test]
    async fn test_without_catalog() {
        let (_, _, movies) = setup(None);
        assert!(!movies.has_catalog());
        assert!(movies.get_popular_movies().await.unwrap().is_empty());
        assert!(movies.get_movie_by_id("550").await.unwrap().is_none());
    }
}

use crate::error::{ServiceError, ServiceResult};
use crate::movie::MovieService;
use cinetrack_models::Movie;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Completed(Vec<Movie>),
    /// A newer query started before this one finished
    Superseded,
}

/// Debounced search where each new query cancels the one in flight.
///
/// Clones share the same session, so a query issued from any clone
/// supersedes the others.
#[derive(Clone)]
pub struct SearchSession {
    movies: MovieService,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    in_flight: Arc<Mutex<Option<AbortHandle>>>,
}

impl SearchSession {
    pub fn new(movies: MovieService, debounce: Duration) -> Self {
        Self {
            movies,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn search(&self, query: &str) -> ServiceResult<SearchOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let movies = self.movies.clone();
        let debounce = self.debounce;
        let query = query.to_string();

        let task = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            movies.search_movies(&query).await
        });

        {
            let mut slot = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(previous) = slot.replace(task.abort_handle()) {
                previous.abort();
            }
        }

        let result = task.await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Search #{} superseded", generation);
            return Ok(SearchOutcome::Superseded);
        }

        match result {
            Ok(Ok(movies)) => Ok(SearchOutcome::Completed(movies)),
            Ok(Err(e)) => Err(e),
            Err(e) if e.is_cancelled() => Ok(SearchOutcome::Superseded),
            Err(e) => Err(ServiceError::Task(e.to_string())),
        }
    }

    /// Abort whatever query is in flight
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut slot = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MovieCache;
    use crate::review::ReviewService;
    use crate::testing::{catalog_movie, FakeCatalog};
    use cinetrack_sources::{MemoryStore, MovieCatalog};

    fn session(catalog: Arc<FakeCatalog>, debounce_ms: u64) -> SearchSession {
        let store = Arc::new(MemoryStore::new());
        let movies = MovieService::new(
            store.clone(),
            Some(catalog as Arc<dyn MovieCatalog>),
            MovieCache::default(),
            ReviewService::new(store, "u1"),
            "u1",
        );
        SearchSession::new(movies, Duration::from_millis(debounce_ms))
    }

    fn catalog() -> Arc<FakeCatalog> {
        Arc::new(FakeCatalog::with_popular(vec![
            catalog_movie("1", "Matrix"),
            catalog_movie("2", "Matrix Reloaded"),
            catalog_movie("3", "Amélie"),
        ]))
    }

    #[tokio::test]
    async fn test_single_search_completes() {
        let session = session(catalog(), 5);
        match session.search("matrix").await.unwrap() {
            SearchOutcome::Completed(movies) => assert_eq!(movies.len(), 2),
            SearchOutcome::Superseded => panic!("search should not be superseded"),
        }
    }

    #[tokio::test]
    async fn test_newer_query_supersedes_older() {
        let catalog = catalog();
        let session = session(catalog.clone(), 50);
        let second = session.clone();

        let (older, newer) = tokio::join!(session.search("mat"), async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            second.search("amé").await
        });

        assert_eq!(older.unwrap(), SearchOutcome::Superseded);
        match newer.unwrap() {
            SearchOutcome::Completed(movies) => assert_eq!(movies[0].title, "Amélie"),
            SearchOutcome::Superseded => panic!("latest search must complete"),
        }
        // the older query was aborted during its debounce window
        assert_eq!(catalog.queries.lock().unwrap().as_slice(), ["amé"]);
    }

    #[tokio::test]
    async fn test_blank_query_completes_empty() {
        let catalog = catalog();
        let session = session(catalog.clone(), 1);
        assert_eq!(session.search("  ").await.unwrap(), SearchOutcome::Completed(Vec::new()));
        assert!(catalog.queries.lock().unwrap().is_empty());
    }
}

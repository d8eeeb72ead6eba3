use cinetrack_models::Movie;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

struct CachedMovie {
    movie: Movie,
    stored_at: Instant,
}

/// In-memory cache of catalog responses, keyed by movie id.
///
/// Entries expire after the configured TTL and are dropped lazily on read.
/// Cloning shares the underlying map.
#[derive(Clone)]
pub struct MovieCache {
    entries: Arc<RwLock<HashMap<String, CachedMovie>>>,
    ttl: Duration,
}

impl MovieCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, id: &str) -> Option<Movie> {
        {
            let entries = self.entries.read().await;
            match entries.get(id) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    debug!("Cache hit: movie {}", id);
                    return Some(entry.movie.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        debug!("Cache expired: movie {}", id);
        self.entries.write().await.remove(id);
        None
    }

    pub async fn insert(&self, movie: &Movie) {
        let mut entries = self.entries.write().await;
        entries.insert(
            movie.id.clone(),
            CachedMovie {
                movie: movie.clone().with_status(None),
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn insert_many(&self, movies: &[Movie]) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        for movie in movies {
            entries.insert(
                movie.id.clone(),
                CachedMovie {
                    movie: movie.clone().with_status(None),
                    stored_at: now,
                },
            );
        }
        debug!("Cache saved {} movie(s), {} total", movies.len(), entries.len());
    }

    pub async fn remove(&self, id: &str) {
        self.entries.write().await.remove(id);
    }
}

impl Default for MovieCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::catalog_movie;
    use cinetrack_models::ReviewStatus;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = MovieCache::default();
        assert!(cache.get("550").await.is_none());

        cache.insert(&catalog_movie("550", "Clube da Luta")).await;
        let hit = cache.get("550").await.unwrap();
        assert_eq!(hit.title, "Clube da Luta");
    }

    #[tokio::test]
    async fn test_status_is_not_cached() {
        let cache = MovieCache::default();
        let movie = catalog_movie("1", "A").with_status(Some(ReviewStatus::Like));
        cache.insert_many(&[movie]).await;
        assert_eq!(cache.get("1").await.unwrap().status, None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_dropped() {
        let cache = MovieCache::new(Duration::from_millis(0));
        cache.insert(&catalog_movie("1", "A")).await;
        assert!(cache.get("1").await.is_none());
        assert!(!cache.entries.read().await.contains_key("1"));
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = MovieCache::default();
        let other = cache.clone();
        other.insert(&catalog_movie("2", "B")).await;
        assert!(cache.get("2").await.is_some());
        cache.remove("2").await;
        assert!(other.get("2").await.is_none());
    }
}

use crate::cache::MovieCache;
use crate::comment::CommentService;
use crate::movie::MovieService;
use crate::playlist::PlaylistService;
use crate::review::ReviewService;
use crate::search::SearchSession;
use crate::tag::TagService;
use cinetrack_sources::{DocumentStore, MovieCatalog};
use std::sync::Arc;
use std::time::Duration;

/// Every data-access service, wired for one signed-in user
#[derive(Clone)]
pub struct Services {
    pub uid: String,
    pub movies: MovieService,
    pub reviews: ReviewService,
    pub tags: TagService,
    pub comments: CommentService,
    pub playlists: PlaylistService,
}

impl Services {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        catalog: Option<Arc<dyn MovieCatalog>>,
        cache: MovieCache,
        uid: &str,
    ) -> Self {
        let reviews = ReviewService::new(store.clone(), uid);
        let movies = MovieService::new(store.clone(), catalog, cache, reviews.clone(), uid);
        Self {
            uid: uid.to_string(),
            tags: TagService::new(store.clone(), uid),
            comments: CommentService::new(store.clone(), uid),
            playlists: PlaylistService::new(store, movies.clone(), uid),
            movies,
            reviews,
        }
    }

    pub fn search_session(&self, debounce: Duration) -> SearchSession {
        SearchSession::new(self.movies.clone(), debounce)
    }
}

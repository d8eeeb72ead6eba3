use crate::error::{ServiceError, ServiceResult};
use crate::movie::MovieService;
use crate::{parse_document, parse_documents};
use chrono::Utc;
use cinetrack_models::{Movie, Playlist, PlaylistPatch};
use cinetrack_sources::{CollectionPath, DocumentStore};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};

const COLLECTION: &str = "playlists";

#[derive(Clone)]
pub struct PlaylistService {
    store: Arc<dyn DocumentStore>,
    movies: MovieService,
    uid: String,
    collection: CollectionPath,
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl PlaylistService {
    pub fn new(store: Arc<dyn DocumentStore>, movies: MovieService, uid: &str) -> Self {
        Self {
            store,
            movies,
            uid: uid.to_string(),
            collection: CollectionPath::user(uid, COLLECTION),
        }
    }

    pub async fn create_playlist(
        &self,
        name: &str,
        description: Option<String>,
        cover_url: Option<String>,
    ) -> ServiceResult<Playlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("A playlist needs a name".to_string()));
        }

        let mut playlist = Playlist {
            id: String::new(),
            user_id: self.uid.clone(),
            name: name.to_string(),
            description: clean(description),
            movie_ids: Vec::new(),
            cover_url: clean(cover_url),
            created_at: Utc::now(),
        };
        playlist.id = self.store.insert(&self.collection, playlist.to_document()).await?;
        info!("Created playlist {} ({})", playlist.id, playlist.name);
        Ok(playlist)
    }

    pub async fn get_playlist_by_id(&self, id: &str) -> ServiceResult<Option<Playlist>> {
        Ok(parse_document(self.store.get(&self.collection, id).await?)?)
    }

    async fn require(&self, id: &str) -> ServiceResult<Playlist> {
        self.get_playlist_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Playlist", id))
    }

    async fn save(&self, playlist: &Playlist) -> ServiceResult<()> {
        self.store.set(&self.collection, &playlist.id, playlist.to_document()).await?;
        Ok(())
    }

    /// Oldest first
    pub async fn get_user_playlists(&self) -> ServiceResult<Vec<Playlist>> {
        let documents = self.store.list(&self.collection).await?;
        let mut playlists: Vec<Playlist> = parse_documents(&documents, "playlist");
        playlists.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(playlists)
    }

    pub async fn update_playlist(&self, id: &str, patch: PlaylistPatch) -> ServiceResult<Playlist> {
        let patch = PlaylistPatch {
            name: patch.name.map(|n| n.trim().to_string()),
            description: patch.description.map(clean),
            cover_url: patch.cover_url.map(clean),
        };
        if matches!(patch.name.as_deref(), Some("")) {
            return Err(ServiceError::Validation("A playlist needs a name".to_string()));
        }

        let mut playlist = self.require(id).await?;
        patch.apply(&mut playlist);
        self.save(&playlist).await?;
        info!("Updated playlist {}", id);
        Ok(playlist)
    }

    /// Append a movie; adding one already present leaves the order untouched
    pub async fn add_movie(&self, id: &str, movie_id: &str) -> ServiceResult<Playlist> {
        if movie_id.trim().is_empty() {
            return Err(ServiceError::Validation("Movie id cannot be empty".to_string()));
        }
        let mut playlist = self.require(id).await?;
        if playlist.contains(movie_id) {
            debug!("Movie {} already in playlist {}", movie_id, id);
            return Ok(playlist);
        }
        playlist.movie_ids.push(movie_id.to_string());
        self.save(&playlist).await?;
        info!("Added movie {} to playlist {}", movie_id, id);
        Ok(playlist)
    }

    pub async fn remove_movie(&self, id: &str, movie_id: &str) -> ServiceResult<Playlist> {
        let mut playlist = self.require(id).await?;
        let before = playlist.movie_ids.len();
        playlist.movie_ids.retain(|m| m != movie_id);
        if playlist.movie_ids.len() != before {
            self.save(&playlist).await?;
            info!("Removed movie {} from playlist {}", movie_id, id);
        }
        Ok(playlist)
    }

    pub async fn delete_playlist(&self, id: &str) -> ServiceResult<()> {
        self.store.delete(&self.collection, id).await?;
        info!("Deleted playlist {}", id);
        Ok(())
    }

    /// Resolve the playlist's movies in order, skipping ids that no longer resolve
    pub async fn get_playlist_movies(&self, id: &str) -> ServiceResult<Vec<Movie>> {
        let playlist = self.require(id).await?;
        let lookups = playlist.movie_ids.iter().map(|movie_id| self.movies.get_movie_by_id(movie_id));
        let resolved = join_all(lookups).await;

        let mut movies = Vec::with_capacity(resolved.len());
        for (movie_id, result) in playlist.movie_ids.iter().zip(resolved) {
            match result? {
                Some(movie) => movies.push(movie),
                None => debug!("Playlist {} references unknown movie {}", id, movie_id),
            }
        }
        Ok(movies)
    }
}

use crate::catalog::MovieCatalog;
use crate::error::CatalogError;
use crate::http::create_http_client;
use crate::tmdb::api::{self, ApiSettings};
use async_trait::async_trait;
use cinetrack_config::Config;
use cinetrack_models::Movie;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct TmdbClient {
    client: Arc<Client>,
    settings: ApiSettings,
}

impl TmdbClient {
    pub fn new(client: Arc<Client>, settings: ApiSettings) -> Self {
        Self { client, settings }
    }

    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        let token = config.tmdb_token().ok_or(CatalogError::MissingToken)?;
        let client = create_http_client(Duration::from_secs(config.http.timeout_secs));
        Ok(Self::new(
            Arc::new(client),
            ApiSettings {
                base_url: config.tmdb.base_url.clone(),
                image_base_url: config.tmdb.image_base_url.clone(),
                language: config.tmdb.language.clone(),
                token,
            },
        ))
    }
}

/// TMDB ids are plain integers
fn is_catalog_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    fn catalog_name(&self) -> &str {
        "tmdb"
    }

    async fn popular_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        api::get_popular(&self.client, &self.settings, 1).await
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>, CatalogError> {
        api::search(&self.client, &self.settings, query.trim(), 1).await
    }

    async fn movie_details(&self, id: &str) -> Result<Option<Movie>, CatalogError> {
        if !is_catalog_id(id) {
            debug!("'{}' is not a TMDB id, skipping detail fetch", id);
            return Ok(None);
        }
        api::get_details(&self.client, &self.settings, id).await
    }
}

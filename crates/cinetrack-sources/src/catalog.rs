use async_trait::async_trait;
use cinetrack_models::Movie;
use crate::error::CatalogError;

/// Remote movie metadata catalog (TMDB in production)
///
/// Implementations return movies already shaped as local `Movie`s: catalog
/// ids as strings, absolute poster URLs, `is_tmdb` set.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    fn catalog_name(&self) -> &str;

    async fn popular_movies(&self) -> Result<Vec<Movie>, CatalogError>;

    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>, CatalogError>;

    /// `Ok(None)` when the catalog has no movie with this id
    async fn movie_details(&self, id: &str) -> Result<Option<Movie>, CatalogError>;
}

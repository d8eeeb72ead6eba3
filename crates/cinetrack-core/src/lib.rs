pub mod auth;
pub mod cache;
pub mod comment;
pub mod error;
pub mod filter;
pub mod movie;
pub mod playlist;
pub mod review;
pub mod search;
pub mod services;
pub mod tag;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::AuthGateway;
pub use cache::MovieCache;
pub use comment::CommentService;
pub use error::{ServiceError, ServiceResult};
pub use filter::{MovieFilter, Provenance};
pub use movie::{MovieDeletion, MovieService};
pub use playlist::PlaylistService;
pub use review::ReviewService;
pub use search::{SearchOutcome, SearchSession};
pub use services::Services;
pub use tag::TagService;
pub use validation::{validate_email, validate_password, PasswordCheck};

use cinetrack_sources::{Document, StoreError};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Parse every document, skipping (and logging) ones that no longer match the model
pub(crate) fn parse_documents<T: DeserializeOwned>(documents: &[Document], kind: &str) -> Vec<T> {
    documents
        .iter()
        .filter_map(|doc| match doc.parse::<T>() {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping malformed {} document {}: {}", kind, doc.id, e);
                None
            }
        })
        .collect()
}

pub(crate) fn parse_document<T: DeserializeOwned>(document: Option<Document>) -> Result<Option<T>, StoreError> {
    document.map(|doc| doc.parse::<T>()).transpose()
}

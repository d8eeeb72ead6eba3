use cinetrack_sources::{AuthError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Movie {0} is not a user-entered movie and cannot be changed")]
    NotExternal(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Credential store error: {0}")]
    Credentials(#[from] anyhow::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl ServiceError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        ServiceError::NotFound { kind, id: id.into() }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

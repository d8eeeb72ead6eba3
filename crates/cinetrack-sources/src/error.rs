use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("No catalog API token configured")]
    MissingToken,

    #[error("Catalog returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("An account already exists for this email")]
    EmailExists,

    #[error("Password rejected by the provider: {0}")]
    WeakPassword(String),

    #[error("Too many attempts, try again later")]
    TooManyAttempts,

    #[error("This account has been disabled")]
    UserDisabled,

    #[error("Session expired, sign in again")]
    SessionExpired,

    #[error("Identity provider error {code}: {message}")]
    Provider { code: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Map data service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode map data: {0}")]
    Decode(#[from] serde_json::Error),
}

pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{CinemaConfig, Config, FirebaseConfig, HttpConfig, LocalProfileConfig, SearchConfig, TmdbConfig, TMDB_TOKEN_ENV};
pub use credentials::{CredentialStore, StoredSession};
pub use paths::{PathManager, base_path_override};

pub mod catalog;
pub mod cinemas;
pub mod error;
pub mod http;
pub mod identity;
pub mod store;
pub mod tmdb;

pub use catalog::MovieCatalog;
pub use cinemas::{Cinema, OverpassClient};
pub use error::{AuthError, CatalogError, LocatorError, StoreError};
pub use identity::{FirebaseAuth, IdentityProvider, Session};
pub use store::{CollectionPath, Document, DocumentStore, FirestoreStore, JsonFileStore, MemoryStore};
pub use tmdb::TmdbClient;

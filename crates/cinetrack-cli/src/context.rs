use cinetrack_config::{Config, CredentialStore, FirebaseConfig, PathManager};
use cinetrack_core::{AuthGateway, MovieCache, Services};
use cinetrack_sources::http::create_http_client;
use cinetrack_sources::{FirebaseAuth, FirestoreStore, JsonFileStore, MovieCatalog, OverpassClient, TmdbClient};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Loaded configuration plus the factories every command needs
pub struct AppContext {
    pub config: Config,
    pub paths: PathManager,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = if config_file.exists() {
            Config::load_from_file(&config_file)
                .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?
        } else {
            debug!("No config at {}, using defaults", config_file.display());
            Config::default()
        };
        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;

        Ok(Self { config, paths })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.http.timeout_secs)
    }

    /// Firebase settings, only when fully configured
    pub fn firebase(&self) -> Option<&FirebaseConfig> {
        if self.config.is_firebase_configured() {
            self.config.firebase.as_ref()
        } else {
            None
        }
    }

    pub fn credentials(&self) -> Result<CredentialStore> {
        let mut store = CredentialStore::new(self.paths.credentials_file());
        store
            .load()
            .map_err(|e| eyre!("Failed to load credentials: {}", e))?;
        Ok(store)
    }

    pub fn auth_gateway(&self) -> Result<AuthGateway> {
        let firebase = self.firebase().ok_or_else(|| {
            eyre!(
                "No identity provider configured. Add a [firebase] section to {} (currently running offline as '{}')",
                self.paths.config_file().display(),
                self.config.local.email
            )
        })?;
        let provider = Arc::new(FirebaseAuth::from_config(firebase, self.timeout()));
        Ok(AuthGateway::new(provider, self.credentials()?))
    }

    fn catalog(&self) -> Option<Arc<dyn MovieCatalog>> {
        match TmdbClient::from_config(&self.config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                debug!("Catalog disabled: {}", e);
                None
            }
        }
    }

    pub fn cinemas(&self) -> OverpassClient {
        OverpassClient::from_config(&self.config.cinemas, self.timeout())
    }

    /// Services for the signed-in user, or for the local profile when no
    /// identity provider is configured
    pub async fn services(&self) -> Result<Services> {
        let cache = MovieCache::new(Duration::from_secs(self.config.tmdb.cache_ttl_secs));

        if let Some(firebase) = self.firebase() {
            let mut gateway = self.auth_gateway()?;
            let session = gateway
                .ensure_fresh()
                .await?
                .cloned()
                .ok_or_else(|| eyre!("Not signed in. Run 'cinetrack auth login' first"))?;
            let store = FirestoreStore::new(
                Arc::new(create_http_client(self.timeout())),
                &firebase.firestore_url,
                &firebase.project_id,
            )
            .with_id_token(session.id_token.clone());
            debug!("Using Firestore project {} as {}", firebase.project_id, session.email());
            return Ok(Services::new(Arc::new(store), self.catalog(), cache, session.uid()));
        }

        self.paths
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create data directories: {}", e))?;
        let store = JsonFileStore::open(&self.paths.store_file())?;
        debug!("Using local store {} as '{}'", self.paths.store_file().display(), self.config.local.uid);
        Ok(Services::new(Arc::new(store), self.catalog(), cache, &self.config.local.uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinetrack_models::MovieDraft;
    use tempfile::TempDir;

    fn offline_context(dir: &TempDir) -> AppContext {
        AppContext {
            config: Config::default(),
            paths: PathManager::from_base(dir.path().to_path_buf()),
        }
    }

    #[tokio::test]
    async fn test_offline_services_use_local_store() {
        let dir = TempDir::new().unwrap();
        let ctx = offline_context(&dir);

        let services = ctx.services().await.unwrap();
        assert_eq!(services.uid, "local");

        let draft = MovieDraft {
            title: "Aquarius".to_string(),
            ..MovieDraft::default()
        };
        services.movies.create_external_movie(draft).await.unwrap();
        assert!(ctx.paths.store_file().exists());

        let reopened = ctx.services().await.unwrap();
        assert_eq!(reopened.movies.list_external_movies().await.unwrap().len(), 1);
    }

    #[test]
    fn test_auth_requires_firebase() {
        let dir = TempDir::new().unwrap();
        let ctx = offline_context(&dir);
        assert!(ctx.firebase().is_none());
        assert!(ctx.auth_gateway().is_err());

        let mut ctx = ctx;
        ctx.config.firebase = Some(FirebaseConfig::new("key", "movies-app"));
        assert!(ctx.auth_gateway().is_ok());
    }
}

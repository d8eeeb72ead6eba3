use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that overrides `[tmdb].api_token`
pub const TMDB_TOKEN_ENV: &str = "TMDB_API_TOKEN";

const PLACEHOLDER_TOKEN: &str = "YOUR_TMDB_TOKEN";
const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub firebase: Option<FirebaseConfig>,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub cinemas: CinemaConfig,
    #[serde(default)]
    pub local: LocalProfileConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TmdbConfig {
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// How long a fetched movie stays in the in-memory cache
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

/// Identity provider + remote document store (Firebase project)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    #[serde(default = "default_identity_url")]
    pub identity_url: String,
    #[serde(default = "default_firestore_url")]
    pub firestore_url: String,
    /// Exchanges refresh tokens for new id tokens
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CinemaConfig {
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,
}

/// Profile used when no identity provider is configured
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LocalProfileConfig {
    #[serde(default = "default_local_uid")]
    pub uid: String,
    #[serde(default = "default_local_email")]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_language() -> String {
    "pt-BR".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    3600 // 1 hour
}

fn default_identity_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_firestore_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_token_url() -> String {
    "https://securetoken.googleapis.com/v1/token".to_string()
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_radius_m() -> u32 {
    5000
}

fn default_local_uid() -> String {
    "local".to_string()
}

fn default_local_email() -> String {
    "local@localhost".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_token: PLACEHOLDER_TOKEN.to_string(),
            base_url: default_tmdb_base_url(),
            image_base_url: default_image_base_url(),
            language: default_language(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl FirebaseConfig {
    /// Project settings with the public Google endpoints
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            identity_url: default_identity_url(),
            firestore_url: default_firestore_url(),
            token_url: default_token_url(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms() }
    }
}

impl Default for CinemaConfig {
    fn default() -> Self {
        Self {
            overpass_url: default_overpass_url(),
            radius_m: default_radius_m(),
        }
    }
}

impl Default for LocalProfileConfig {
    fn default() -> Self {
        Self {
            uid: default_local_uid(),
            email: default_local_email(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb: TmdbConfig::default(),
            firebase: None,
            search: SearchConfig::default(),
            cinemas: CinemaConfig::default(),
            local: LocalProfileConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Token used for catalog requests; the environment wins over the file
    pub fn tmdb_token(&self) -> Option<String> {
        std::env::var(TMDB_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| {
                let token = self.tmdb.api_token.trim();
                if token.is_empty() || token == PLACEHOLDER_TOKEN {
                    None
                } else {
                    Some(token.to_string())
                }
            })
    }

    pub fn is_tmdb_configured(&self) -> bool {
        self.tmdb_token().is_some()
    }

    pub fn is_firebase_configured(&self) -> bool {
        if let Some(ref firebase) = self.firebase {
            !firebase.api_key.is_empty()
                && firebase.api_key != PLACEHOLDER_API_KEY
                && !firebase.project_id.is_empty()
        } else {
            false
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tmdb.base_url.is_empty() {
            return Err(anyhow::anyhow!("tmdb.base_url cannot be empty"));
        }
        if !self.tmdb.base_url.starts_with("http") {
            return Err(anyhow::anyhow!("tmdb.base_url must be an http(s) URL"));
        }
        if self.http.timeout_secs == 0 {
            return Err(anyhow::anyhow!("http.timeout_secs must be greater than zero"));
        }
        if self.cinemas.radius_m == 0 {
            return Err(anyhow::anyhow!("cinemas.radius_m must be greater than zero"));
        }

        if let Some(ref firebase) = self.firebase {
            if firebase.api_key.is_empty() || firebase.api_key == PLACEHOLDER_API_KEY {
                return Err(anyhow::anyhow!("firebase is configured but api_key is not set"));
            }
            if firebase.project_id.is_empty() {
                return Err(anyhow::anyhow!("firebase is configured but project_id is not set"));
            }
        }

        if self.local.uid.trim().is_empty() {
            return Err(anyhow::anyhow!("local.uid cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            tmdb: TmdbConfig {
                api_token: "test_token".to_string(),
                ..TmdbConfig::default()
            },
            firebase: Some(FirebaseConfig::new("key", "movies-app")),
            ..Config::default()
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.tmdb.api_token, "test_token");
        assert_eq!(loaded.tmdb.language, "pt-BR");
        assert_eq!(loaded.firebase.as_ref().unwrap().project_id, "movies-app");
        assert_eq!(loaded.search.debounce_ms, 400);
    }

    #[test]
    fn test_minimal_file_fills_defaults() {
        let config: Config = toml::from_str("[tmdb]\napi_token = \"abc\"\n").unwrap();
        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.tmdb.image_base_url, "https://image.tmdb.org/t/p/w500");
        assert_eq!(config.cinemas.radius_m, 5000);
        assert_eq!(config.local.uid, "local");
        assert!(config.firebase.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config {
            firebase: Some(FirebaseConfig::new("YOUR_API_KEY", "p")),
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(!config.is_firebase_configured());

        config.firebase = Some(FirebaseConfig::new("real", "p"));
        assert!(config.validate().is_ok());
        assert!(config.is_firebase_configured());

        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_placeholder_token_is_not_configured() {
        let config = Config::default();
        if std::env::var(TMDB_TOKEN_ENV).is_err() {
            assert!(!config.is_tmdb_configured());
        }
    }
}

use anyhow::Result;
use chrono::{DateTime, Utc};
use cinetrack_models::UserProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

const SESSION_KEYS: [&str; 7] = [
    "session_uid",
    "session_email",
    "session_display_name",
    "session_photo_url",
    "session_id_token",
    "session_refresh_token",
    "session_expires",
];

/// Signed-in session as persisted between runs
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub profile: UserProfile,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|at| at <= Utc::now()).unwrap_or(false)
    }
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn get_session(&self) -> Option<StoredSession> {
        let uid = self.get("session_uid")?.clone();
        let email = self.get("session_email")?.clone();
        let id_token = self.get("session_id_token")?.clone();
        let refresh_token = self.get("session_refresh_token").cloned().unwrap_or_default();
        let expires_at = self
            .get("session_expires")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Some(StoredSession {
            profile: UserProfile {
                uid,
                email,
                display_name: self.get("session_display_name").cloned(),
                photo_url: self.get("session_photo_url").cloned(),
            },
            id_token,
            refresh_token,
            expires_at,
        })
    }

    pub fn set_session(&mut self, session: &StoredSession) {
        self.clear_session();
        self.set("session_uid".to_string(), session.profile.uid.clone());
        self.set("session_email".to_string(), session.profile.email.clone());
        if let Some(ref name) = session.profile.display_name {
            self.set("session_display_name".to_string(), name.clone());
        }
        if let Some(ref photo) = session.profile.photo_url {
            self.set("session_photo_url".to_string(), photo.clone());
        }
        self.set("session_id_token".to_string(), session.id_token.clone());
        self.set("session_refresh_token".to_string(), session.refresh_token.clone());
        if let Some(expires) = session.expires_at {
            self.set("session_expires".to_string(), expires.to_rfc3339());
        }
    }

    pub fn clear_session(&mut self) {
        for key in SESSION_KEYS {
            self.remove(key);
        }
    }

    pub fn get_all_keys(&self) -> Vec<String> {
        self.credentials.keys().cloned().collect()
    }
}

pub mod firebase;

pub use firebase::FirebaseAuth;

use crate::error::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinetrack_config::StoredSession;
use cinetrack_models::UserProfile;

/// Authenticated identity returned by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub profile: UserProfile,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn uid(&self) -> &str {
        &self.profile.uid
    }

    pub fn email(&self) -> &str {
        &self.profile.email
    }
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            profile: stored.profile,
            id_token: stored.id_token,
            refresh_token: stored.refresh_token,
            expires_at: stored.expires_at,
        }
    }
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            profile: session.profile.clone(),
            id_token: session.id_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.expires_at,
        }
    }
}

/// Third-party account service. Consumed as-is; password rules beyond the
/// provider's own are enforced by the caller.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn sign_up(&self, email: &str, password: &str, display_name: Option<&str>) -> Result<Session, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Exchange the refresh token for a fresh id token
    async fn refresh_session(&self, session: &Session) -> Result<Session, AuthError>;

    /// Returns the session with the refreshed profile
    async fn update_profile(
        &self,
        session: &Session,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<Session, AuthError>;

    async fn update_password(&self, session: &Session, new_password: &str) -> Result<Session, AuthError>;

    async fn delete_account(&self, session: &Session) -> Result<(), AuthError>;

    /// Providers with server-side sessions can revoke here
    async fn sign_out(&self, _session: &Session) -> Result<(), AuthError> {
        Ok(())
    }
}

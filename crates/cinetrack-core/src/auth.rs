use crate::error::{ServiceError, ServiceResult};
use crate::validation::{validate_email, validate_password};
use cinetrack_config::{CredentialStore, StoredSession};
use cinetrack_models::UserProfile;
use cinetrack_sources::{AuthError, IdentityProvider, Session};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Front door to the identity provider.
///
/// Inputs are checked locally before any request goes out, and every
/// session change is written to the credential store so the next run
/// starts signed in.
pub struct AuthGateway {
    provider: Arc<dyn IdentityProvider>,
    credentials: CredentialStore,
    session: Option<Session>,
}

fn check_email(email: &str) -> ServiceResult<String> {
    let email = email.trim();
    if !validate_email(email) {
        return Err(ServiceError::Validation(format!("'{}' is not a valid email address", email)));
    }
    Ok(email.to_string())
}

fn check_password(password: &str) -> ServiceResult<()> {
    let check = validate_password(password);
    if !check.is_acceptable() {
        return Err(ServiceError::Validation(format!(
            "Password needs {}",
            check.missing().join(", ")
        )));
    }
    Ok(())
}

impl AuthGateway {
    /// `credentials` should already be loaded; a stored session is picked up as-is
    pub fn new(provider: Arc<dyn IdentityProvider>, credentials: CredentialStore) -> Self {
        let session = credentials.get_session().map(Session::from);
        if let Some(ref s) = session {
            debug!("Restored session for {}", s.email());
        }
        Self {
            provider,
            credentials,
            session,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.session.as_ref().map(|s| &s.profile)
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    fn require_session(&self) -> ServiceResult<&Session> {
        self.session.as_ref().ok_or(ServiceError::NotSignedIn)
    }

    fn persist(&mut self, session: Session) -> ServiceResult<&Session> {
        self.credentials.set_session(&StoredSession::from(&session));
        self.credentials.save()?;
        let stored: &Session = self.session.insert(session);
        Ok(stored)
    }

    fn forget(&mut self) -> ServiceResult<()> {
        self.session = None;
        self.credentials.clear_session();
        self.credentials.save()?;
        Ok(())
    }

    /// Refresh the stored session when its id token has expired. A refresh
    /// the provider rejects signs the user out.
    pub async fn ensure_fresh(&mut self) -> ServiceResult<Option<&Session>> {
        let Some(session) = self.session.clone() else {
            return Ok(None);
        };
        if !StoredSession::from(&session).is_expired() {
            return Ok(self.session.as_ref());
        }

        debug!("Session for {} expired, refreshing", session.email());
        match self.provider.refresh_session(&session).await {
            Ok(refreshed) => Ok(Some(self.persist(refreshed)?)),
            Err(AuthError::SessionExpired) => {
                warn!("Stored session for {} can no longer be refreshed", session.email());
                self.forget()?;
                Err(AuthError::SessionExpired.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn sign_up(&mut self, email: &str, password: &str, display_name: Option<&str>) -> ServiceResult<&Session> {
        let email = check_email(email)?;
        check_password(password)?;
        let display_name = display_name.map(str::trim).filter(|n| !n.is_empty());

        let session = self.provider.sign_up(&email, password, display_name).await?;
        info!("Signed up {}", session.email());
        self.persist(session)
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> ServiceResult<&Session> {
        let email = check_email(email)?;
        if password.is_empty() {
            return Err(ServiceError::Validation("Password cannot be empty".to_string()));
        }

        let session = self.provider.sign_in(&email, password).await?;
        info!("Signed in {}", session.email());
        self.persist(session)
    }

    /// Signing out while signed out is a no-op
    pub async fn sign_out(&mut self) -> ServiceResult<()> {
        if let Some(session) = self.session.as_ref() {
            if let Err(e) = self.provider.sign_out(session).await {
                warn!("Provider sign-out failed, clearing local session anyway: {}", e);
            }
            info!("Signed out {}", session.email());
        }
        self.forget()
    }

    pub async fn update_profile(&mut self, display_name: Option<&str>, photo_url: Option<&str>) -> ServiceResult<&Session> {
        let session = self.require_session()?.clone();
        let display_name = display_name.map(str::trim).filter(|n| !n.is_empty());
        let photo_url = photo_url.map(str::trim).filter(|p| !p.is_empty());
        if display_name.is_none() && photo_url.is_none() {
            return Err(ServiceError::Validation("Nothing to update".to_string()));
        }

        let updated = self.provider.update_profile(&session, display_name, photo_url).await?;
        info!("Updated profile of {}", updated.email());
        self.persist(updated)
    }

    pub async fn update_password(&mut self, new_password: &str) -> ServiceResult<&Session> {
        let session = self.require_session()?.clone();
        check_password(new_password)?;

        let updated = self.provider.update_password(&session, new_password).await?;
        self.persist(updated)
    }

    pub async fn delete_account(&mut self) -> ServiceResult<()> {
        let session = self.require_session()?.clone();
        self.provider.delete_account(&session).await?;
        info!("Deleted account {}", session.email());
        self.forget()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeIdentity;
    use chrono::{Duration, Utc};
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    fn gateway(dir: &TempDir, provider: Arc<FakeIdentity>) -> AuthGateway {
        let mut credentials = CredentialStore::new(dir.path().join("credentials.toml"));
        credentials.load().unwrap();
        AuthGateway::new(provider, credentials)
    }

    #[tokio::test]
    async fn test_sign_up_persists_session() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FakeIdentity::default());

        let mut auth = gateway(&dir, provider.clone());
        let uid = auth
            .sign_up("ana@example.com", "Pipoca#2024", Some(" Ana "))
            .await
            .unwrap()
            .uid()
            .to_string();
        assert_eq!(auth.current_user().unwrap().display_name.as_deref(), Some("Ana"));

        let restored = gateway(&dir, provider);
        assert!(restored.is_signed_in());
        assert_eq!(restored.session().unwrap().uid(), uid);
    }

    #[tokio::test]
    async fn test_sign_up_validates_before_calling_provider() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FakeIdentity::default());
        let mut auth = gateway(&dir, provider.clone());

        let err = auth.sign_up("ana@example.com", "abc", None).await.unwrap_err();
        match err {
            ServiceError::Validation(message) => assert!(message.contains("uppercase")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            auth.sign_up("not-an-email", "Pipoca#2024", None).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(provider.accounts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FakeIdentity::default());
        let mut auth = gateway(&dir, provider.clone());
        auth.sign_up("bia@example.com", "Pipoca#2024", None).await.unwrap();
        auth.sign_out().await.unwrap();
        assert!(!auth.is_signed_in());

        assert!(matches!(
            auth.sign_in("bia@example.com", "wrong").await,
            Err(ServiceError::Auth(AuthError::InvalidCredentials))
        ));
        auth.sign_in("bia@example.com", "Pipoca#2024").await.unwrap();
        assert!(auth.is_signed_in());

        auth.sign_out().await.unwrap();
        auth.sign_out().await.unwrap();
        assert!(!gateway(&dir, provider).is_signed_in());
    }

    #[tokio::test]
    async fn test_profile_and_password_need_session() {
        let dir = TempDir::new().unwrap();
        let mut auth = gateway(&dir, Arc::new(FakeIdentity::default()));
        assert!(matches!(auth.update_profile(Some("X"), None).await, Err(ServiceError::NotSignedIn)));
        assert!(matches!(auth.update_password("Pipoca#2024").await, Err(ServiceError::NotSignedIn)));
        assert!(matches!(auth.delete_account().await, Err(ServiceError::NotSignedIn)));
    }

    #[tokio::test]
    async fn test_update_profile_and_delete_account() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FakeIdentity::default());
        let mut auth = gateway(&dir, provider.clone());
        auth.sign_up("caio@example.com", "Pipoca#2024", None).await.unwrap();

        let photo = auth
            .update_profile(None, Some("https://img.example.com/caio.png"))
            .await
            .unwrap()
            .profile
            .photo_url
            .clone();
        assert_eq!(photo.as_deref(), Some("https://img.example.com/caio.png"));
        assert!(matches!(auth.update_password("fraca").await, Err(ServiceError::Validation(_))));

        auth.delete_account().await.unwrap();
        assert!(!auth.is_signed_in());
        assert!(provider.accounts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_session_is_refreshed() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FakeIdentity::default());
        let mut auth = gateway(&dir, provider.clone());
        auth.sign_up("duda@example.com", "Pipoca#2024", None).await.unwrap();

        let mut stale = auth.session().unwrap().clone();
        stale.expires_at = Some(Utc::now() - Duration::minutes(5));
        auth.persist(stale).unwrap();

        let token = auth.ensure_fresh().await.unwrap().unwrap().id_token.clone();
        assert_eq!(token, "token-2");
        assert_eq!(provider.refreshes.load(Ordering::SeqCst), 1);

        // fresh sessions are left alone
        auth.ensure_fresh().await.unwrap();
        assert_eq!(provider.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_refresh_signs_out() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(FakeIdentity {
            reject_refresh: true,
            ..FakeIdentity::default()
        });
        let mut auth = gateway(&dir, provider.clone());
        auth.sign_up("eva@example.com", "Pipoca#2024", None).await.unwrap();
        let mut stale = auth.session().unwrap().clone();
        stale.expires_at = Some(Utc::now() - Duration::minutes(1));
        auth.persist(stale).unwrap();

        assert!(matches!(
            auth.ensure_fresh().await,
            Err(ServiceError::Auth(AuthError::SessionExpired))
        ));
        assert!(!gateway(&dir, provider).is_signed_in());
    }
}

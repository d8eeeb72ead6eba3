use crate::error::AuthError;
use crate::http::create_http_client;
use crate::identity::{IdentityProvider, Session};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use cinetrack_config::FirebaseConfig;
use cinetrack_models::UserProfile;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Firebase Authentication through the Identity Toolkit REST API
#[derive(Clone)]
pub struct FirebaseAuth {
    client: Arc<Client>,
    api_key: String,
    identity_url: String,
    token_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>, // seconds, as a string
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

/// Secure token endpoint answers in snake_case
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl FirebaseAuth {
    pub fn new(client: Arc<Client>, api_key: String, identity_url: String, token_url: String) -> Self {
        Self {
            client,
            api_key,
            identity_url,
            token_url,
        }
    }

    pub fn from_config(config: &FirebaseConfig, timeout: std::time::Duration) -> Self {
        Self::new(
            Arc::new(create_http_client(timeout)),
            config.api_key.clone(),
            config.identity_url.clone(),
            config.token_url.clone(),
        )
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{}", self.identity_url.trim_end_matches('/'), method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T, AuthError> {
        let request = self
            .client
            .post(self.endpoint(method))
            .query(&[("key", self.api_key.as_str())])
            .json(&body);
        send(request, method).await
    }
}

async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder, label: &str) -> Result<T, AuthError> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        debug!("Identity provider call {} failed with {}: {}", label, status, message);
        return Err(map_error_message(&message));
    }

    Ok(response.json().await?)
}

fn expires_at(expires_in: Option<&str>) -> Option<chrono::DateTime<Utc>> {
    expires_in
        .and_then(|s| s.parse::<i64>().ok())
        .map(|secs| Utc::now() + Duration::seconds(secs))
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        let expires_at = expires_at(token.expires_in.as_deref());
        Session {
            profile: UserProfile {
                uid: token.local_id,
                email: token.email,
                display_name: token.display_name.filter(|n| !n.is_empty()),
                photo_url: token.photo_url.filter(|p| !p.is_empty()),
            },
            id_token: token.id_token,
            refresh_token: token.refresh_token,
            expires_at,
        }
    }
}

/// Map a provider message such as `WEAK_PASSWORD : Password should be at least 6 characters`
pub fn map_error_message(message: &str) -> AuthError {
    let (code, detail) = match message.split_once(':') {
        Some((code, detail)) => (code.trim(), detail.trim()),
        None => (message.trim(), ""),
    };

    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthError::InvalidCredentials,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
        "EMAIL_EXISTS" => AuthError::EmailExists,
        "WEAK_PASSWORD" => AuthError::WeakPassword(detail.to_string()),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
        "USER_DISABLED" => AuthError::UserDisabled,
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "USER_NOT_FOUND"
        | "INVALID_REFRESH_TOKEN" | "MISSING_REFRESH_TOKEN" => {
            AuthError::SessionExpired
        }
        other => AuthError::Provider {
            code: other.to_string(),
            message: detail.to_string(),
        },
    }
}

/// Fold an update response into the session it was made with
fn apply_update(session: &Session, update: UpdateResponse) -> Session {
    let mut next = session.clone();
    next.profile.display_name = update.display_name.filter(|n| !n.is_empty());
    next.profile.photo_url = update.photo_url.filter(|p| !p.is_empty());
    if let Some(token) = update.id_token {
        next.id_token = token;
        next.expires_at = expires_at(update.expires_in.as_deref()).or(session.expires_at);
    }
    if let Some(refresh) = update.refresh_token {
        next.refresh_token = refresh;
    }
    next
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    fn provider_name(&self) -> &str {
        "firebase"
    }

    async fn sign_up(&self, email: &str, password: &str, display_name: Option<&str>) -> Result<Session, AuthError> {
        let token: TokenResponse = self
            .call("signUp", json!({ "email": email, "password": password, "returnSecureToken": true }))
            .await?;
        let session = Session::from(token);
        info!("Created account for {}", session.email());

        match display_name {
            Some(name) => self.update_profile(&session, Some(name), None).await,
            None => Ok(session),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let token: TokenResponse = self
            .call(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        info!("Signed in as {}", token.email);
        Ok(Session::from(token))
    }

    async fn refresh_session(&self, session: &Session) -> Result<Session, AuthError> {
        let request = self
            .client
            .post(&self.token_url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[("grant_type", "refresh_token"), ("refresh_token", session.refresh_token.as_str())]);
        let refreshed: RefreshResponse = send(request, "token").await?;
        debug!("Refreshed id token for {}", session.email());

        let mut next = session.clone();
        next.expires_at = expires_at(refreshed.expires_in.as_deref());
        next.id_token = refreshed.id_token;
        next.refresh_token = refreshed.refresh_token;
        Ok(next)
    }

    async fn update_profile(
        &self,
        session: &Session,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<Session, AuthError> {
        let mut body = json!({ "idToken": session.id_token, "returnSecureToken": false });
        // Untouched fields must be resent or the provider keeps whatever it had
        let name = display_name.or(session.profile.display_name.as_deref());
        let photo = photo_url.or(session.profile.photo_url.as_deref());
        if let Some(name) = name {
            body["displayName"] = json!(name);
        }
        if let Some(photo) = photo {
            body["photoUrl"] = json!(photo);
        }

        let update: UpdateResponse = self.call("update", body).await?;
        Ok(apply_update(session, update))
    }

    async fn update_password(&self, session: &Session, new_password: &str) -> Result<Session, AuthError> {
        let update: UpdateResponse = self
            .call(
                "update",
                json!({ "idToken": session.id_token, "password": new_password, "returnSecureToken": true }),
            )
            .await?;
        info!("Password updated for {}", session.email());
        Ok(apply_update(session, update))
    }

    async fn delete_account(&self, session: &Session) -> Result<(), AuthError> {
        let _: serde_json::Value = self.call("delete", json!({ "idToken": session.id_token })).await?;
        info!("Deleted account {}", session.email());
        Ok(())
    }
}

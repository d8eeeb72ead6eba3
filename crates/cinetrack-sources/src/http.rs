use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("cinetrack/", env!("CARGO_PKG_VERSION"));

/// Shared reqwest client with the configured request timeout
pub fn create_http_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Read an error body for logging without failing on undecodable payloads
pub(crate) async fn error_text(response: reqwest::Response) -> (u16, String) {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    (status, text)
}

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Per-request timeout for consent manager calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("Consent URI is not set up")]
    NotConfigured,

    #[error("Consent manager returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Consent manager connection settings, loaded from `[consent]` in the
/// config file. An unset `uri` is a hard precondition failure on the
/// create and import paths.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConsentSettings {
    /// Base URI of the consent manager, e.g. `https://consent.example.com/v1/`
    pub uri: Option<String>,
    pub service_key: String,
    pub secret_key: String,
}

impl ConsentSettings {
    pub fn is_configured(&self) -> bool {
        self.uri.as_deref().is_some_and(|uri| !uri.is_empty())
    }
}

/// Ephemeral bearer token from a consent manager login.
///
/// Fetched once per create/import request and reused for every row of
/// that request; never persisted.
#[derive(Debug, Clone)]
pub struct ConsentToken(String);

impl ConsentToken {
    pub fn new(jwt: impl Into<String>) -> Self {
        Self(jwt.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outbound consent manager operations.
///
/// A trait seam so the application layer stays decoupled from the HTTP
/// implementation and tests can substitute a mock.
#[async_trait]
pub trait ConsentApi: Send + Sync {
    fn is_configured(&self) -> bool;

    /// Exchange the service key + secret key for a bearer token.
    async fn login(&self) -> Result<ConsentToken, ConsentError>;

    /// Register a local user with the consent manager; returns the
    /// remote identifier.
    async fn register_user(
        &self,
        email: &str,
        internal_id: &str,
        token: &ConsentToken,
    ) -> Result<String, ConsentError>;
}

// ── Wire format ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    #[serde(rename = "clientID")]
    client_id: &'a str,
    #[serde(rename = "clientSecret")]
    client_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    jwt: String,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    identifier: &'a str,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    #[serde(rename = "_id")]
    id: String,
}

// ── HTTP implementation ─────────────────────────────────────────

pub struct ConsentHttpClient {
    http: reqwest::Client,
    settings: ConsentSettings,
}

impl ConsentHttpClient {
    pub fn new(settings: ConsentSettings) -> Result<Self, ConsentError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, settings })
    }

    fn endpoint(&self, path: &str) -> Result<String, ConsentError> {
        let base = self
            .settings
            .uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .ok_or(ConsentError::NotConfigured)?;

        if base.ends_with('/') {
            Ok(format!("{base}{path}"))
        } else {
            Ok(format!("{base}/{path}"))
        }
    }
}

/// Decode a consent manager response, turning non-2xx statuses into
/// `ConsentError::Api` with the response body as the message.
async fn decode_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ConsentError> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(ConsentError::from);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "<no response body>".to_string());

    Err(ConsentError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ConsentApi for ConsentHttpClient {
    fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    async fn login(&self) -> Result<ConsentToken, ConsentError> {
        let url = self.endpoint("participants/login")?;
        debug!(%url, "Logging into consent manager");

        let response = self
            .http
            .post(&url)
            .json(&LoginRequest {
                client_id: &self.settings.service_key,
                client_secret: &self.settings.secret_key,
            })
            .send()
            .await?;

        let body: LoginResponse = decode_response(response).await?;
        Ok(ConsentToken::new(body.jwt))
    }

    async fn register_user(
        &self,
        email: &str,
        internal_id: &str,
        token: &ConsentToken,
    ) -> Result<String, ConsentError> {
        let url = self.endpoint("users/register")?;
        debug!(%url, internal_id, "Registering user with consent manager");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.as_str())
            .json(&RegisterRequest {
                email,
                identifier: internal_id,
            })
            .send()
            .await?;

        let body: RegisterResponse = decode_response(response).await?;
        Ok(body.id)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn client(uri: Option<&str>) -> ConsentHttpClient {
        ConsentHttpClient::new(ConsentSettings {
            uri: uri.map(String::from),
            service_key: "service".into(),
            secret_key: "secret".into(),
        })
        .expect("client")
    }

    #[test]
    fn endpoint_joins_with_trailing_slash() {
        let c = client(Some("https://consent.example.com/v1/"));
        assert_eq!(
            c.endpoint("participants/login").unwrap(),
            "https://consent.example.com/v1/participants/login"
        );
    }

    #[test]
    fn endpoint_inserts_missing_slash() {
        let c = client(Some("https://consent.example.com/v1"));
        assert_eq!(
            c.endpoint("users/register").unwrap(),
            "https://consent.example.com/v1/users/register"
        );
    }

    #[tokio::test]
    async fn login_without_uri_is_not_configured() {
        let c = client(None);
        assert!(!c.is_configured());
        assert!(matches!(c.login().await, Err(ConsentError::NotConfigured)));
    }

    #[tokio::test]
    async fn register_without_uri_is_not_configured() {
        let c = client(Some(""));
        let token = ConsentToken::new("jwt");
        let result = c.register_user("a@x.com", "A1", &token).await;
        assert!(matches!(result, Err(ConsentError::NotConfigured)));
    }
}

//! Credential acquisition for the content source.
//!
//! [`OAuthTokenProvider`] performs the generic OAuth2 client-credentials
//! exchange against a configured token endpoint. [`CachedTokenProvider`] wraps
//! any provider with silent-first behaviour: an unexpired cached credential is
//! reused without a network round-trip, a stale or absent one triggers a fresh
//! acquisition through the inner provider.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::OAuthSettings;
use crate::contract::TokenProvider;

/// Clock skew subtracted from a credential's lifetime before it counts as
/// expired, so a token is never presented in its final seconds.
const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("token endpoint returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("could not parse token response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A bearer access token plus optional expiry.
///
/// Immutable for the run's duration; shared by reference with every fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// A credential with no known expiry, mostly useful in tests.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    /// Whether the credential is expired, or will be within `skew`.
    /// A credential with no expiry metadata never reports expired.
    pub fn is_expired(&self, skew: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + skew >= expires_at,
            None => false,
        }
    }
}

/// Standard OAuth 2.0 token response.
#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Acquires credentials via the OAuth2 client-credentials grant.
pub struct OAuthTokenProvider {
    http: reqwest::Client,
    settings: OAuthSettings,
}

impl OAuthTokenProvider {
    pub fn new(http: reqwest::Client, settings: OAuthSettings) -> Self {
        Self { http, settings }
    }
}

#[async_trait]
impl TokenProvider for OAuthTokenProvider {
    async fn acquire_token(&self) -> Result<Credential, AuthError> {
        let mut form_data = HashMap::new();
        form_data.insert("grant_type", "client_credentials");
        form_data.insert("client_id", self.settings.client_id.as_str());
        form_data.insert("client_secret", self.settings.client_secret.as_str());
        if let Some(scope) = &self.settings.scope {
            form_data.insert("scope", scope.as_str());
        }

        debug!(token_url = %self.settings.token_url, "Requesting access token");

        let response = self
            .http
            .post(&self.settings.token_url)
            .header("Accept", "application/json")
            .form(&form_data)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::Status { status, body });
        }

        let token_response: TokenResponse = serde_json::from_str(&body)?;
        debug!(
            token_type = ?token_response.token_type,
            expires_in = ?token_response.expires_in,
            "Access token acquired"
        );

        let expires_at = token_response
            .expires_in
            .map(|seconds| Utc::now() + Duration::seconds(seconds));

        Ok(Credential {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}

/// Silent-first wrapper around another provider.
///
/// Holds at most one credential. `acquire_token` returns the cached one while
/// it is valid and refreshes through the inner provider otherwise.
pub struct CachedTokenProvider<P> {
    inner: P,
    cached: Mutex<Option<Credential>>,
}

impl<P> CachedTokenProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<P> TokenProvider for CachedTokenProvider<P>
where
    P: TokenProvider,
{
    async fn acquire_token(&self) -> Result<Credential, AuthError> {
        let mut slot = self.cached.lock().await;
        if let Some(credential) = slot.as_ref() {
            if !credential.is_expired(Duration::seconds(EXPIRY_SKEW_SECONDS)) {
                debug!("Reusing cached access token");
                return Ok(credential.clone());
            }
            warn!("Cached access token expired");
        }

        info!("No suitable token in cache, acquiring a new one");
        let fresh = self.inner.acquire_token().await?;
        *slot = Some(fresh.clone());
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MockTokenProvider;

    #[test]
    fn token_response_deserialises_full() {
        let json = r#"{
            "access_token": "tok123",
            "token_type": "JWT",
            "expires_in": 1800
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "tok123");
        assert_eq!(response.expires_in, Some(1800));
        assert_eq!(response.token_type, Some("JWT".to_string()));
    }

    #[test]
    fn token_response_deserialises_minimal() {
        let json = r#"{ "access_token": "tok123" }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "tok123");
        assert_eq!(response.expires_in, None);
        assert_eq!(response.token_type, None);
    }

    #[test]
    fn token_response_without_access_token_is_an_error() {
        let json = r#"{ "token_type": "JWT" }"#;
        assert!(serde_json::from_str::<TokenResponse>(json).is_err());
    }

    #[test]
    fn credential_without_expiry_never_expires() {
        let credential = Credential::bearer("tok");
        assert!(!credential.is_expired(Duration::seconds(60)));
    }

    #[test]
    fn credential_expiry_respects_skew() {
        let credential = Credential {
            access_token: "tok".into(),
            expires_at: Some(Utc::now() + Duration::seconds(30)),
        };
        assert!(credential.is_expired(Duration::seconds(60)));
        assert!(!credential.is_expired(Duration::seconds(0)));
    }

    #[tokio::test]
    async fn cached_provider_acquires_only_once_while_valid() {
        let mut inner = MockTokenProvider::new();
        inner.expect_acquire_token().times(1).returning(|| {
            Ok(Credential {
                access_token: "tok".into(),
                expires_at: Some(Utc::now() + Duration::seconds(3600)),
            })
        });

        let provider = CachedTokenProvider::new(inner);
        let first = provider.acquire_token().await.unwrap();
        let second = provider.acquire_token().await.unwrap();
        assert_eq!(first.access_token, second.access_token);
    }

    #[tokio::test]
    async fn cached_provider_refreshes_expired_token() {
        let mut inner = MockTokenProvider::new();
        let mut call = 0;
        inner.expect_acquire_token().times(2).returning(move || {
            call += 1;
            Ok(Credential {
                access_token: format!("tok-{call}"),
                // Already inside the skew window, so the next acquire refreshes.
                expires_at: Some(Utc::now() + Duration::seconds(10)),
            })
        });

        let provider = CachedTokenProvider::new(inner);
        let first = provider.acquire_token().await.unwrap();
        let second = provider.acquire_token().await.unwrap();
        assert_eq!(first.access_token, "tok-1");
        assert_eq!(second.access_token, "tok-2");
    }
}

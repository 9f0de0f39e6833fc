//! Confidential client for the OAuth2 client-credentials flow.
//!
//! Owns the token cache: silent lookups are served from it and every
//! successful credential grant refreshes it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument};

use crate::config::{CredentialConfig, HttpConfig};
use crate::error::AuthError;
use crate::secure::AccessToken;

/// Tokens expiring within this window are treated as expired.
const EXPIRY_GRACE_MINUTES: i64 = 5;

/// Token acquisition paths offered by an identity library.
#[async_trait]
pub trait ConfidentialClient: Send + Sync {
    /// Return a cached, still-valid token for the scopes.
    async fn acquire_token_silent(&self, scopes: &[String]) -> Result<AccessToken, AuthError>;

    /// Request a new token with the application's own credentials.
    async fn acquire_token_by_credential(&self, scopes: &[String])
        -> Result<AccessToken, AuthError>;
}

/// Token response from Azure AD.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: String,
    expires_in: i64,
}

/// Error response from the Azure AD token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
}

/// Client-credentials client against an Azure AD authority.
pub struct AzureConfidentialClient {
    credentials: Arc<CredentialConfig>,
    http_client: reqwest::Client,
    cache: RwLock<HashMap<String, AccessToken>>,
    grace_period: Duration,
}

impl AzureConfidentialClient {
    /// Create a new confidential client from the tenant credentials.
    pub fn new(credentials: Arc<CredentialConfig>, http: &HttpConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(http.timeout())
            .connect_timeout(http.connect_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            credentials,
            http_client,
            cache: RwLock::new(HashMap::new()),
            grace_period: Duration::minutes(EXPIRY_GRACE_MINUTES),
        })
    }

    /// Drop every cached token, forcing a credential grant on next use.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    fn cache_key(scopes: &[String]) -> String {
        scopes.join(" ")
    }
}

#[async_trait]
impl ConfidentialClient for AzureConfidentialClient {
    async fn acquire_token_silent(&self, scopes: &[String]) -> Result<AccessToken, AuthError> {
        let cache = self.cache.read().await;
        match cache.get(&Self::cache_key(scopes)) {
            Some(token) if !token.is_expired(self.grace_period) => {
                debug!("Using cached token");
                Ok(token.clone())
            }
            Some(_) => Err(AuthError::TokenExpired),
            None => Err(AuthError::CacheMiss),
        }
    }

    #[instrument(skip(self), fields(client_id = %self.credentials.client_id()))]
    async fn acquire_token_by_credential(
        &self,
        scopes: &[String],
    ) -> Result<AccessToken, AuthError> {
        let scope = Self::cache_key(scopes);
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.client_secret().as_str()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http_client
            .post(self.credentials.token_url())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Only the OAuth error code is surfaced, never the raw body
            let code = response
                .json::<TokenErrorResponse>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| "unknown_error".to_string());
            error!("Token request failed: HTTP {} - {}", status, code);
            return Err(AuthError::TokenRequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                code
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))?;

        let expires_at = Some(token_response.expires_in)
            .filter(|seconds| *seconds >= 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::InvalidTokenResponse(format!(
                    "expires_in out of range: {}",
                    token_response.expires_in
                ))
            })?;
        let token = AccessToken::new(token_response.access_token, expires_at);

        self.cache.write().await.insert(scope, token.clone());

        debug!(
            "Acquired new token, expires at {}",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AzureConfidentialClient {
        let credentials = CredentialConfig::new(
            "contoso.onmicrosoft.com",
            "C",
            "S",
            "",
            "https://graph.example.com/.default",
            "T",
            "https://graph.example.com/v1.0/users",
            "https://login.example.com/T",
        );
        AzureConfidentialClient::new(Arc::new(credentials), &HttpConfig::default()).unwrap()
    }

    fn scopes() -> Vec<String> {
        vec!["https://graph.example.com/.default".to_string()]
    }

    #[tokio::test]
    async fn test_silent_miss_on_empty_cache() {
        let result = client().acquire_token_silent(&scopes()).await;
        assert!(matches!(result, Err(AuthError::CacheMiss)));
    }

    #[tokio::test]
    async fn test_silent_hit_and_expiry() {
        let client = client();
        let key = AzureConfidentialClient::cache_key(&scopes());

        client.cache.write().await.insert(
            key.clone(),
            AccessToken::new("fresh".into(), Utc::now() + Duration::hours(1)),
        );
        let token = client.acquire_token_silent(&scopes()).await.unwrap();
        assert_eq!(token.secret(), "fresh");

        client.cache.write().await.insert(
            key,
            AccessToken::new("stale".into(), Utc::now() + Duration::minutes(1)),
        );
        let result = client.acquire_token_silent(&scopes()).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let client = client();
        client.cache.write().await.insert(
            AzureConfidentialClient::cache_key(&scopes()),
            AccessToken::new("fresh".into(), Utc::now() + Duration::hours(1)),
        );

        client.clear_cache().await;

        let result = client.acquire_token_silent(&scopes()).await;
        assert!(matches!(result, Err(AuthError::CacheMiss)));
    }
}

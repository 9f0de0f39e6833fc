//! Credential provider: silent lookup first, client-credentials grant as fallback.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::auth::confidential::{AzureConfidentialClient, ConfidentialClient};
use crate::config::{CredentialConfig, HttpConfig};
use crate::error::AzureError;
use crate::secure::AccessToken;

/// Capability to hand out bearer tokens for Graph calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn acquire_token(&self) -> Result<AccessToken, AzureError>;
}

/// Acquires Graph tokens for the configured tenant.
pub struct CredentialProvider<C = AzureConfidentialClient> {
    credentials: Arc<CredentialConfig>,
    client: C,
}

impl CredentialProvider<AzureConfidentialClient> {
    /// Create a provider backed by the Azure AD confidential client.
    pub fn new(credentials: Arc<CredentialConfig>, http: &HttpConfig) -> Result<Self, AzureError> {
        let client = AzureConfidentialClient::new(Arc::clone(&credentials), http)
            .map_err(AzureError::TokenAcquisitionFailed)?;
        Ok(Self::with_client(credentials, client))
    }
}

impl<C: ConfidentialClient> CredentialProvider<C> {
    /// Create a provider around any confidential client.
    pub fn with_client(credentials: Arc<CredentialConfig>, client: C) -> Self {
        Self {
            credentials,
            client,
        }
    }

    pub fn credentials(&self) -> &CredentialConfig {
        &self.credentials
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: ConfidentialClient> TokenProvider for CredentialProvider<C> {
    async fn acquire_token(&self) -> Result<AccessToken, AzureError> {
        let scopes = self.credentials.scopes();

        match self.client.acquire_token_silent(&scopes).await {
            Ok(token) => {
                debug!("Silent token acquisition succeeded");
                return Ok(token);
            }
            Err(e) => warn!("Silent token acquisition failed ({}), using client credentials", e),
        }

        match self.client.acquire_token_by_credential(&scopes).await {
            Ok(token) => {
                info!("Acquired token for {}", self.credentials.graph_url());
                Ok(token)
            }
            Err(e) => {
                error!("Client credentials token acquisition failed: {}", e);
                Err(AzureError::TokenAcquisitionFailed(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, ErrorKind};
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Confidential client with scripted outcomes that counts its calls.
    struct ScriptedClient {
        silent: Option<&'static str>,
        credential: Option<&'static str>,
        silent_calls: AtomicUsize,
        credential_calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(silent: Option<&'static str>, credential: Option<&'static str>) -> Self {
            Self {
                silent,
                credential,
                silent_calls: AtomicUsize::new(0),
                credential_calls: AtomicUsize::new(0),
            }
        }
    }

    fn token(value: &str) -> AccessToken {
        AccessToken::new(value.to_string(), Utc::now() + Duration::hours(1))
    }

    #[async_trait]
    impl ConfidentialClient for ScriptedClient {
        async fn acquire_token_silent(&self, _: &[String]) -> Result<AccessToken, AuthError> {
            self.silent_calls.fetch_add(1, Ordering::SeqCst);
            self.silent.map(token).ok_or(AuthError::CacheMiss)
        }

        async fn acquire_token_by_credential(
            &self,
            _: &[String],
        ) -> Result<AccessToken, AuthError> {
            self.credential_calls.fetch_add(1, Ordering::SeqCst);
            self.credential
                .map(token)
                .ok_or_else(|| AuthError::TokenRequestFailed("HTTP 401: invalid_client".into()))
        }
    }

    fn credentials() -> Arc<CredentialConfig> {
        Arc::new(CredentialConfig::new(
            "example.onmicrosoft.com",
            "C",
            "S",
            "",
            "https://graph.example.com/.default",
            "T",
            "https://graph.example.com/v1.0/users",
            "https://login.example.com/T",
        ))
    }

    #[tokio::test]
    async fn test_silent_success_skips_credential_grant() {
        let provider =
            CredentialProvider::with_client(credentials(), ScriptedClient::new(Some("cached"), None));

        let token = provider.acquire_token().await.unwrap();

        assert_eq!(token.secret(), "cached");
        assert_eq!(provider.client().silent_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.client().credential_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_silent_failure_falls_back_to_credential_grant() {
        let provider =
            CredentialProvider::with_client(credentials(), ScriptedClient::new(None, Some("abc123")));

        let token = provider.acquire_token().await.unwrap();

        assert_eq!(token.secret(), "abc123");
        assert_eq!(provider.client().credential_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_both_paths_failing() {
        let provider =
            CredentialProvider::with_client(credentials(), ScriptedClient::new(None, None));

        let err = provider.acquire_token().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TokenAcquisitionFailed);
        assert_eq!(provider.client().silent_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.client().credential_calls.load(Ordering::SeqCst), 1);
    }
}

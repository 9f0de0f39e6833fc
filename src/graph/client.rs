//! Authenticated Microsoft Graph client handle.
//!
//! Built in layers: a client-secret credential, an authentication provider
//! scoped to the Graph resource, a request adapter bound to the Graph base
//! URL, and finally the client handle itself.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, error, info};
use url::Url;

use crate::auth::{CredentialProvider, TokenProvider};
use crate::config::{ApiConfig, CredentialConfig, HttpConfig};
use crate::error::AzureError;
use crate::secure::AccessToken;
use crate::users::client::parse_user_response;
use crate::users::AzUser;
use crate::web::{HttpWebClient, RawResponse, WebClient};

/// Application credential made of tenant ID, client ID and client secret.
pub struct ClientSecretCredential {
    provider: CredentialProvider,
}

impl ClientSecretCredential {
    pub fn new(credentials: Arc<CredentialConfig>, http: &HttpConfig) -> Result<Self, AzureError> {
        if credentials.tenant_id().trim().is_empty() {
            return Err(AzureError::ClientInitializationFailed(
                "credential: tenant ID is empty".into(),
            ));
        }
        if credentials.client_id().trim().is_empty() {
            return Err(AzureError::ClientInitializationFailed(
                "credential: client ID is empty".into(),
            ));
        }
        if credentials.client_secret().is_empty() {
            return Err(AzureError::ClientInitializationFailed(
                "credential: client secret is empty".into(),
            ));
        }

        let provider = CredentialProvider::new(credentials, http)
            .map_err(|e| AzureError::ClientInitializationFailed(format!("credential: {}", e)))?;

        Ok(Self { provider })
    }
}

#[async_trait]
impl TokenProvider for ClientSecretCredential {
    async fn acquire_token(&self) -> Result<AccessToken, AzureError> {
        self.provider.acquire_token().await
    }
}

/// Supplies bearer tokens for one Graph resource.
pub struct AuthenticationProvider<T = ClientSecretCredential> {
    credential: T,
    resource: String,
}

impl<T: TokenProvider> AuthenticationProvider<T> {
    pub fn new(credential: T, resource: &str) -> Result<Self, AzureError> {
        Url::parse(resource).map_err(|e| {
            AzureError::ClientInitializationFailed(format!("auth provider: {}: {}", resource, e))
        })?;

        Ok(Self {
            credential,
            resource: resource.to_string(),
        })
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub async fn authorization_token(&self) -> Result<AccessToken, AzureError> {
        self.credential.acquire_token().await
    }
}

/// Sends authenticated requests relative to the Graph base URL.
pub struct RequestAdapter<T = ClientSecretCredential, W = HttpWebClient> {
    auth_provider: AuthenticationProvider<T>,
    web_client: W,
    base_url: String,
}

impl<T: TokenProvider, W: WebClient> RequestAdapter<T, W> {
    pub fn new(
        auth_provider: AuthenticationProvider<T>,
        web_client: W,
        base_url: &str,
    ) -> Result<Self, AzureError> {
        Url::parse(base_url).map_err(|e| {
            AzureError::ClientInitializationFailed(format!("request adapter: {}: {}", base_url, e))
        })?;

        Ok(Self {
            auth_provider,
            web_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request to `<base_url>/<path>` with a fresh token.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<RawResponse, AzureError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let token = self.auth_provider.authorization_token().await?;

        debug!("Graph {} {}", method, url);

        Ok(self
            .web_client
            .send(&url, body, token.secret(), method)
            .await?)
    }
}

/// Graph client handle.
pub struct GraphServiceClient<T = ClientSecretCredential, W = HttpWebClient> {
    adapter: RequestAdapter<T, W>,
}

impl GraphServiceClient {
    /// Build the full client stack from configuration.
    ///
    /// Every construction failure is reported as `ClientInitializationFailed`.
    pub fn initialize(
        credentials: Arc<CredentialConfig>,
        api: &ApiConfig,
        http: &HttpConfig,
    ) -> Result<Self, AzureError> {
        let resource = credentials.graph_url().to_string();

        let credential = ClientSecretCredential::new(credentials, http)
            .inspect_err(|e| error!("Graph client initialization failed: {}", e))?;
        let auth_provider = AuthenticationProvider::new(credential, &resource)
            .inspect_err(|e| error!("Graph client initialization failed: {}", e))?;
        let web_client = HttpWebClient::new(http).map_err(|e| {
            AzureError::ClientInitializationFailed(format!("request adapter: {}", e))
        })?;
        let adapter = RequestAdapter::new(auth_provider, web_client, &api.graph_base_url)
            .inspect_err(|e| error!("Graph client initialization failed: {}", e))?;

        info!("Graph client initialized for {}", adapter.base_url());
        Ok(Self::from_adapter(adapter))
    }
}

impl<T: TokenProvider, W: WebClient> GraphServiceClient<T, W> {
    pub fn from_adapter(adapter: RequestAdapter<T, W>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &RequestAdapter<T, W> {
        &self.adapter
    }

    /// Fetch a user by object ID or user principal name.
    pub async fn get_user(&self, id: &str) -> Result<AzUser, AzureError> {
        if id.trim().is_empty() {
            return Err(AzureError::InvalidInput("user id must not be empty".into()));
        }

        let response = self
            .adapter
            .send(
                Method::GET,
                &format!("users/{}", urlencoding::encode(id)),
                None,
            )
            .await?;

        parse_user_response(&response)
    }
}

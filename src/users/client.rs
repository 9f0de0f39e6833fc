//! Guest-user provisioning against the Graph `users` endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::{error, info, instrument};

use super::models::AzUser;
use super::request::UserCreationRequest;
use crate::auth::{CredentialProvider, TokenProvider};
use crate::config::{CredentialConfig, HttpConfig};
use crate::error::AzureError;
use crate::web::{HttpWebClient, RawResponse, WebClient};

/// Capability to manage users in the B2C directory.
#[async_trait]
pub trait UserManagement: Send + Sync {
    /// Create a guest user that signs in with its email address.
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AzUser, AzureError>;

    /// Attach extension attributes to a user. Not available yet.
    async fn add_extension_to_user(&self, session_key: &str) -> Result<(), AzureError>;
}

/// Graph error envelope: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetail {
    code: String,
    #[serde(default)]
    message: String,
}

/// Turn a Graph user response into an [`AzUser`] or a classified error.
pub(crate) fn parse_user_response(response: &RawResponse) -> Result<AzUser, AzureError> {
    if response.is_success() {
        return serde_json::from_str(&response.body)
            .map_err(|e| AzureError::ResponseDeserializationFailed(e.to_string()));
    }

    let status = response.status.as_u16();
    match serde_json::from_str::<GraphErrorResponse>(&response.body) {
        Ok(body) => {
            error!("Graph request failed: HTTP {} - {}", status, body.error.code);
            Err(AzureError::GraphRejected {
                status,
                code: body.error.code,
                message: body.error.message,
            })
        }
        Err(e) => {
            error!("Graph request failed: HTTP {} with unreadable body", status);
            Err(AzureError::ResponseDeserializationFailed(format!(
                "HTTP {}: {}",
                status, e
            )))
        }
    }
}

/// B2C user client for one tenant.
pub struct AzureModel<T = CredentialProvider, W = HttpWebClient> {
    credentials: Arc<CredentialConfig>,
    token_provider: T,
    web_client: W,
}

impl AzureModel {
    /// Create a user client with the Azure AD credential provider and HTTP transport.
    pub fn new(credentials: Arc<CredentialConfig>, http: &HttpConfig) -> Result<Self, AzureError> {
        let token_provider = CredentialProvider::new(Arc::clone(&credentials), http)?;
        let web_client = HttpWebClient::new(http)?;
        Ok(Self::with_parts(credentials, token_provider, web_client))
    }
}

impl<T: TokenProvider, W: WebClient> AzureModel<T, W> {
    pub fn with_parts(credentials: Arc<CredentialConfig>, token_provider: T, web_client: W) -> Self {
        Self {
            credentials,
            token_provider,
            web_client,
        }
    }

    pub fn token_provider(&self) -> &T {
        &self.token_provider
    }
}

fn require(field: &str, value: &str) -> Result<(), AzureError> {
    if value.trim().is_empty() {
        return Err(AzureError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[async_trait]
impl<T: TokenProvider, W: WebClient> UserManagement for AzureModel<T, W> {
    #[instrument(skip(self, password))]
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AzUser, AzureError> {
        require("email", email)?;
        require("password", password)?;
        require("first name", first_name)?;
        require("last name", last_name)?;

        let request = UserCreationRequest::guest(
            self.credentials.host(),
            email,
            password,
            first_name,
            last_name,
        );
        let payload = request
            .to_json()
            .map_err(AzureError::PayloadSerializationFailed)?;

        let token = self.token_provider.acquire_token().await?;

        let response = self
            .web_client
            .send(
                self.credentials.tenant_url(),
                Some(payload),
                token.secret(),
                Method::POST,
            )
            .await?;

        let mut user = parse_user_response(&response)?;
        user.mark_created();

        info!("Created guest user {}", user.id);
        Ok(user)
    }

    async fn add_extension_to_user(&self, _session_key: &str) -> Result<(), AzureError> {
        Err(AzureError::NotImplemented("add_extension_to_user"))
    }
}

//! Configuration loading and management.
//!
//! Loads configuration from embedded config.toml with environment variable overrides.

use crate::secure::SecureString;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Embedded configuration file content.
const CONFIG_TOML: &str = include_str!("../config.toml");

/// Marker used by the placeholder values shipped in config.toml.
const PLACEHOLDER_MARKER: &str = "YOUR_";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub azure: AzureConfig,
    pub api: ApiConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
}

/// Raw tenant settings as they appear in config.toml.
///
/// Converted into an immutable [`CredentialConfig`] before use.
#[derive(Clone, Deserialize)]
pub struct AzureConfig {
    pub host: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub login_client_id: String,
    pub graph_url: String,
    pub tenant_id: String,
    pub tenant_url: String,
    pub authority_url: String,
}

impl std::fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureConfig")
            .field("host", &self.host)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("login_client_id", &self.login_client_id)
            .field("graph_url", &self.graph_url)
            .field("tenant_id", &self.tenant_id)
            .field("tenant_url", &self.tenant_url)
            .field("authority_url", &self.authority_url)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub graph_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from embedded config.toml with environment variable overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::from_toml_str(CONFIG_TOML)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML document without overrides or validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config.toml")
    }

    fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut String); 10] = [
            ("AZURE_HOST", &mut self.azure.host),
            ("AZURE_CLIENT_ID", &mut self.azure.client_id),
            ("AZURE_CLIENT_SECRET", &mut self.azure.client_secret),
            ("AZURE_LOGIN_CLIENT_ID", &mut self.azure.login_client_id),
            ("AZURE_GRAPH_URL", &mut self.azure.graph_url),
            ("AZURE_TENANT_ID", &mut self.azure.tenant_id),
            ("AZURE_TENANT_URL", &mut self.azure.tenant_url),
            ("AZURE_AUTHORITY_URL", &mut self.azure.authority_url),
            ("AZURE_GRAPH_API_BASE_URL", &mut self.api.graph_base_url),
            ("RUST_LOG", &mut self.logging.level),
        ];

        for (key, slot) in overrides {
            if let Ok(value) = env::var(key) {
                *slot = value;
            }
        }
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("host", "AZURE_HOST", &self.azure.host),
            ("client_id", "AZURE_CLIENT_ID", &self.azure.client_id),
            ("client_secret", "AZURE_CLIENT_SECRET", &self.azure.client_secret),
            ("graph_url", "AZURE_GRAPH_URL", &self.azure.graph_url),
            ("tenant_id", "AZURE_TENANT_ID", &self.azure.tenant_id),
            ("tenant_url", "AZURE_TENANT_URL", &self.azure.tenant_url),
            ("authority_url", "AZURE_AUTHORITY_URL", &self.azure.authority_url),
        ];

        for (field, env_key, value) in required {
            if value.trim().is_empty() || value.contains(PLACEHOLDER_MARKER) {
                anyhow::bail!(
                    "Azure {} not configured. Set {} environment variable \
                     or update config.toml",
                    field,
                    env_key
                );
            }
        }

        for (field, value) in [
            ("graph_url", &self.azure.graph_url),
            ("tenant_url", &self.azure.tenant_url),
            ("authority_url", &self.azure.authority_url),
            ("graph_base_url", &self.api.graph_base_url),
        ] {
            url::Url::parse(value).with_context(|| format!("Invalid URL for {}", field))?;
        }

        Ok(())
    }

    /// Build the immutable credential configuration shared by all clients.
    pub fn credentials(&self) -> CredentialConfig {
        CredentialConfig::new(
            &self.azure.host,
            &self.azure.client_id,
            &self.azure.client_secret,
            &self.azure.login_client_id,
            &self.azure.graph_url,
            &self.azure.tenant_id,
            &self.azure.tenant_url,
            &self.azure.authority_url,
        )
    }
}

/// Tenant credentials and endpoints.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    host: String,
    client_id: String,
    client_secret: SecureString,
    login_client_id: String,
    graph_url: String,
    tenant_id: String,
    tenant_url: String,
    authority_url: String,
}

impl CredentialConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: &str,
        client_id: &str,
        client_secret: &str,
        login_client_id: &str,
        graph_url: &str,
        tenant_id: &str,
        tenant_url: &str,
        authority_url: &str,
    ) -> Self {
        Self {
            host: host.to_string(),
            client_id: client_id.to_string(),
            client_secret: SecureString::from(client_secret.to_string()),
            login_client_id: login_client_id.to_string(),
            graph_url: graph_url.to_string(),
            tenant_id: tenant_id.to_string(),
            tenant_url: tenant_url.to_string(),
            authority_url: authority_url.trim_end_matches('/').to_string(),
        }
    }

    /// B2C tenant domain, used as the issuer of local identities.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &SecureString {
        &self.client_secret
    }

    pub fn login_client_id(&self) -> &str {
        &self.login_client_id
    }

    /// Resource scope requested for access tokens.
    pub fn graph_url(&self) -> &str {
        &self.graph_url
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// User-creation endpoint.
    pub fn tenant_url(&self) -> &str {
        &self.tenant_url
    }

    pub fn authority_url(&self) -> &str {
        &self.authority_url
    }

    /// Token endpoint of the configured authority.
    pub fn token_url(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.authority_url)
    }

    /// Scopes requested for Graph tokens.
    pub fn scopes(&self) -> Vec<String> {
        vec![self.graph_url.clone()]
    }
}

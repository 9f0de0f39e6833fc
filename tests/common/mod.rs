//! Common test utilities for b2c-guest integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use b2c_guest::config::HttpConfig;
use b2c_guest::CredentialConfig;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT_ID: &str = "T";
pub const CLIENT_ID: &str = "C";
pub const CLIENT_SECRET: &str = "S";
pub const ISSUER: &str = "contoso.onmicrosoft.com";
pub const USERS_PATH: &str = "/v1.0/users";

/// Creates a mock OAuth token response.
pub fn create_token_response(access_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

/// Creates a Graph user object as returned by `POST /users`.
pub fn create_user_response(id: &str, email: &str, first: &str, last: &str) -> Value {
    json!({
        "@odata.context": "https://graph.microsoft.com/v1.0/$metadata#users/$entity",
        "id": id,
        "displayName": format!("{} {}", first, last),
        "accountEnabled": true,
        "givenName": first,
        "surname": last,
        "mail": null,
        "mobilePhone": null,
        "createdDateTime": "2024-05-02T10:15:00Z",
        "identities": [{
            "signInType": "emailAddress",
            "issuer": ISSUER,
            "issuerAssignedId": email
        }]
    })
}

/// Creates an OData error response.
pub fn create_odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Mock server wrapper with common setup helpers.
pub struct MockGraphServer {
    pub server: MockServer,
}

impl MockGraphServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub fn token_path(&self) -> String {
        format!("/{}/oauth2/v2.0/token", TENANT_ID)
    }

    /// Credentials pointing every endpoint at this mock server.
    pub fn credentials(&self) -> Arc<CredentialConfig> {
        Arc::new(CredentialConfig::new(
            ISSUER,
            CLIENT_ID,
            CLIENT_SECRET,
            "",
            "https://graph.example.com/.default",
            TENANT_ID,
            &format!("{}{}", self.url(), USERS_PATH),
            &format!("{}/{}", self.url(), TENANT_ID),
        ))
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout_seconds: 5,
            connect_timeout_seconds: 2,
        }
    }

    /// Mount a client-credentials token endpoint that must be hit `expected` times.
    pub async fn mock_token_endpoint(&self, access_token: &str, expected: u64) {
        Mock::given(method("POST"))
            .and(path(self.token_path()))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=C"))
            .and(body_string_contains("client_secret=S"))
            .and(body_string_contains(
                "scope=https%3A%2F%2Fgraph.example.com%2F.default",
            ))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_token_response(access_token, 3599)),
            )
            .expect(expected)
            .mount(&self.server)
            .await;
    }

    /// Mount a token endpoint that rejects the client credentials.
    pub async fn mock_token_rejected(&self) {
        Mock::given(method("POST"))
            .and(path(self.token_path()))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })))
            .mount(&self.server)
            .await;
    }
}

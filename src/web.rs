//! Authenticated JSON transport.
//!
//! Sends a request with a bearer token and hands back the status plus the
//! fully-read body. Transport failures are errors, never an empty response.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::HttpConfig;
use crate::error::WebError;

/// Header Graph echoes back to correlate a request in its logs.
const CLIENT_REQUEST_ID: &str = "client-request-id";

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Capability to issue one authenticated request.
#[async_trait]
pub trait WebClient: Send + Sync {
    async fn send(
        &self,
        url: &str,
        body: Option<String>,
        token: &str,
        method: Method,
    ) -> Result<RawResponse, WebError>;
}

/// `reqwest`-backed transport.
pub struct HttpWebClient {
    http_client: reqwest::Client,
}

impl HttpWebClient {
    pub fn new(http: &HttpConfig) -> Result<Self, WebError> {
        let http_client = reqwest::Client::builder()
            .timeout(http.timeout())
            .connect_timeout(http.connect_timeout())
            .build()
            .map_err(|e| WebError::InvalidRequest(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl WebClient for HttpWebClient {
    async fn send(
        &self,
        url: &str,
        body: Option<String>,
        token: &str,
        method: Method,
    ) -> Result<RawResponse, WebError> {
        let url = url::Url::parse(url).map_err(|e| WebError::InvalidRequest(e.to_string()))?;
        let request_id = Uuid::new_v4().to_string();

        debug!("{} {} ({})", method, url, request_id);

        let mut request = self
            .http_client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(CLIENT_REQUEST_ID, &request_id)
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("Request {} could not be sent: {}", request_id, e);
            WebError::SendFailed(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(WebError::BodyReadFailed)?;

        debug!("Request {} completed with HTTP {}", request_id, status);

        Ok(RawResponse { status, body })
    }
}

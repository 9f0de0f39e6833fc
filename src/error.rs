//! Error types for the b2c-guest library.
//!
//! Uses `thiserror` for library-style errors with automatic `Display` and `Error` implementations.

use thiserror::Error;

/// Errors raised by the confidential client while acquiring tokens.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No cached token for the requested scopes")]
    CacheMiss,

    #[error("Cached token has expired")]
    TokenExpired,

    #[error("Token request failed: {0}")]
    TokenRequestFailed(String),

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// HTTP transport errors. An `Err` always means no response is available.
#[derive(Error, Debug)]
pub enum WebError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Could not send request: {0}")]
    SendFailed(#[source] reqwest::Error),

    #[error("Could not read response body: {0}")]
    BodyReadFailed(#[source] reqwest::Error),
}

/// Classification of an [`AzureError`], independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TokenAcquisitionFailed,
    ClientInitializationFailed,
    PayloadSerializationFailed,
    RequestFailed,
    ResponseDeserializationFailed,
    GraphRejected,
    InvalidInput,
    NotImplemented,
}

/// Top-level error type returned by every public operation.
#[derive(Error, Debug)]
pub enum AzureError {
    #[error("Could not acquire access token: {0}")]
    TokenAcquisitionFailed(#[source] AuthError),

    #[error("Could not initialize Graph client: {0}")]
    ClientInitializationFailed(String),

    #[error("Could not serialize request payload: {0}")]
    PayloadSerializationFailed(#[source] serde_json::Error),

    #[error("Could not make request successfully: {0}")]
    RequestFailed(#[from] WebError),

    #[error("Could not parse response: {0}")]
    ResponseDeserializationFailed(String),

    #[error("Graph API rejected request (HTTP {status}): {code}: {message}")]
    GraphRejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation not implemented: {0}")]
    NotImplemented(&'static str),
}

impl AzureError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TokenAcquisitionFailed(_) => ErrorKind::TokenAcquisitionFailed,
            Self::ClientInitializationFailed(_) => ErrorKind::ClientInitializationFailed,
            Self::PayloadSerializationFailed(_) => ErrorKind::PayloadSerializationFailed,
            Self::RequestFailed(_) => ErrorKind::RequestFailed,
            Self::ResponseDeserializationFailed(_) => ErrorKind::ResponseDeserializationFailed,
            Self::GraphRejected { .. } => ErrorKind::GraphRejected,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }

    /// Returns a user-friendly message for display in the CLI.
    pub fn user_message(&self) -> &str {
        match self {
            Self::TokenAcquisitionFailed(_) => {
                "Could not sign in to Azure AD. Check the client credentials."
            }
            Self::ClientInitializationFailed(_) => "Could not set up the Graph client.",
            Self::PayloadSerializationFailed(_) => "Could not prepare the user request.",
            Self::RequestFailed(_) => "Network error. Check your connection.",
            Self::ResponseDeserializationFailed(_) => "Unexpected response from Azure.",
            Self::GraphRejected { status: 401, .. } => "Authentication expired. Try again.",
            Self::GraphRejected { status: 403, .. } => {
                "Insufficient permissions for this operation."
            }
            Self::GraphRejected { status: 429, .. } => "Too many requests. Please wait a moment.",
            Self::GraphRejected { .. } => "Azure rejected the request.",
            Self::InvalidInput(_) => "Invalid input.",
            Self::NotImplemented(_) => "This operation is not available.",
        }
    }

    /// Returns true if a fresh token might make the same call succeed.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            Self::TokenAcquisitionFailed(_) | Self::GraphRejected { status: 401, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = AzureError::TokenAcquisitionFailed(AuthError::CacheMiss);
        assert_eq!(
            err.user_message(),
            "Could not sign in to Azure AD. Check the client credentials."
        );

        let err = AzureError::GraphRejected {
            status: 403,
            code: "Authorization_RequestDenied".into(),
            message: "Insufficient privileges".into(),
        };
        assert_eq!(
            err.user_message(),
            "Insufficient permissions for this operation."
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            AzureError::NotImplemented("add_extension_to_user").kind(),
            ErrorKind::NotImplemented
        );
        assert_eq!(
            AzureError::ResponseDeserializationFailed("eof".into()).kind(),
            ErrorKind::ResponseDeserializationFailed
        );
        assert_eq!(
            AzureError::from(WebError::InvalidRequest("bad url".into())).kind(),
            ErrorKind::RequestFailed
        );
    }

    #[test]
    fn test_requires_reauth() {
        let err = AzureError::GraphRejected {
            status: 401,
            code: "InvalidAuthenticationToken".into(),
            message: "Access token has expired".into(),
        };
        assert!(err.requires_reauth());

        let err = AzureError::InvalidInput("email".into());
        assert!(!err.requires_reauth());
    }
}

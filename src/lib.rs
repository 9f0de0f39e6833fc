//! Azure AD B2C guest-user client.
//!
//! Acquires Microsoft Graph tokens with the client-credentials flow and
//! provisions guest users through the Graph `users` endpoint.

#![deny(clippy::all)]

pub mod auth;
pub mod config;
pub mod error;
pub mod graph;
pub mod secure;
pub mod users;
pub mod web;

pub use auth::{CredentialProvider, TokenProvider};
pub use config::{Config, CredentialConfig};
pub use error::{AuthError, AzureError, ErrorKind, WebError};
pub use graph::GraphServiceClient;
pub use secure::AccessToken;
pub use users::{AzUser, AzureModel, UserManagement};

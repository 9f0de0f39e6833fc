//! Azure AD authentication module.
//!
//! Provides the client-credentials confidential client with its token cache,
//! and the credential provider that layers the silent-then-grant policy on top.

pub mod confidential;
pub mod provider;

pub use confidential::{AzureConfidentialClient, ConfidentialClient};
pub use provider::{CredentialProvider, TokenProvider};

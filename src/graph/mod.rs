//! Microsoft Graph client initialization.

pub mod client;

pub use client::{AuthenticationProvider, ClientSecretCredential, GraphServiceClient, RequestAdapter};

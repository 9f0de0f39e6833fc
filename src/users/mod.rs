//! B2C guest-user management.
//!
//! This module provides:
//! - The guest-user creation payload
//! - The Graph user response model
//! - The user client that ties token, payload and transport together

pub mod client;
pub mod models;
pub mod request;

pub use client::{AzureModel, UserManagement};
pub use models::{AuthedData, AzUser, IdData};
pub use request::UserCreationRequest;

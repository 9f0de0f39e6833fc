//! Secure data wrappers that are zeroized on drop.
//!
//! The client secret and access tokens only ever live inside these types,
//! so they never end up in `Debug` output or log lines.

use chrono::{DateTime, Duration, Utc};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secure string wrapper that zeroizes its contents on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    pub fn new(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// An OAuth2 bearer token with its expiry.
#[derive(Clone)]
pub struct AccessToken {
    secret: SecureString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(secret: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret: SecureString::new(secret),
            expires_at,
        }
    }

    /// The raw bearer value. Only pass this to an `Authorization` header.
    pub fn secret(&self) -> &str {
        self.secret.as_str()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true if the token is expired or will expire within the grace period.
    pub fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &self.secret)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

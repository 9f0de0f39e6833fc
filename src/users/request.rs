//! Guest-user creation payload.

use serde::Serialize;

use super::models::IdData;
use crate::secure::SecureString;

/// Identity sign-in type for email-based local accounts.
pub const SIGN_IN_TYPE_EMAIL: &str = "emailAddress";

const USER_TYPE_GUEST: &str = "guest";
const CREATION_TYPE_LOCAL: &str = "LocalAccount";
const PREFERRED_LANGUAGE: &str = "en-US";
const PASSWORD_POLICIES: &str = "DisablePasswordExpiration";

/// Body of `POST /users` for a B2C local guest account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreationRequest {
    pub account_enabled: bool,
    pub display_name: String,
    pub given_name: String,
    pub surname: String,
    pub mail: String,
    pub user_type: &'static str,
    pub creation_type: &'static str,
    pub preferred_language: &'static str,
    pub password_policies: &'static str,
    pub password_profile: PasswordProfile,
    pub identities: Vec<IdData>,
}

/// Password profile for user creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordProfile {
    #[serde(serialize_with = "expose_secret")]
    pub password: SecureString,
    pub force_change_password_next_sign_in: bool,
}

fn expose_secret<S: serde::Serializer>(
    secret: &SecureString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.as_str())
}

impl UserCreationRequest {
    /// Build a guest account whose single sign-in identity is the email address.
    ///
    /// `issuer` is the B2C tenant domain.
    pub fn guest(
        issuer: &str,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Self {
        Self {
            account_enabled: true,
            display_name: format!("{} {}", first_name, last_name),
            given_name: first_name.to_string(),
            surname: last_name.to_string(),
            mail: email.to_string(),
            user_type: USER_TYPE_GUEST,
            creation_type: CREATION_TYPE_LOCAL,
            preferred_language: PREFERRED_LANGUAGE,
            password_policies: PASSWORD_POLICIES,
            password_profile: PasswordProfile {
                password: SecureString::new(password.to_string()),
                force_change_password_next_sign_in: false,
            },
            identities: vec![IdData {
                sign_in_type: SIGN_IN_TYPE_EMAIL.to_string(),
                issuer: issuer.to_string(),
                issuer_assigned_id: email.to_string(),
            }],
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

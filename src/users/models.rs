//! Graph user data models.

use serde::{Deserialize, Deserializer, Serialize};

/// Graph sends `null` for unset properties; treat it like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Sign-in identity attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdData {
    /// Identity kind, e.g. "emailAddress" or "userName".
    pub sign_in_type: String,

    /// Tenant domain that issued the identity.
    pub issuer: String,

    /// The sign-in name itself.
    pub issuer_assigned_id: String,
}

/// User object returned by the Graph `users` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzUser {
    #[serde(
        rename = "@odata.context",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub odata_context: String,

    /// Directory object ID. Always present on a real user object.
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub account_enabled: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub given_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub mail: String,

    #[serde(rename = "mobilePhone", default, deserialize_with = "null_as_default")]
    pub telephone_number: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub surname: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub created_date_time: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub identities: Vec<IdData>,

    /// Set by this client once the user was created.
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,

    /// Set by this client once the user was created with a valid token.
    #[serde(default, deserialize_with = "null_as_default")]
    pub authed: bool,

    #[serde(rename = "azauth", default)]
    pub az_auth: AuthedData,
}

impl AzUser {
    /// The email sign-in name, falling back to `mail`.
    pub fn email(&self) -> &str {
        self.identities
            .iter()
            .find(|identity| identity.sign_in_type == "emailAddress")
            .map(|identity| identity.issuer_assigned_id.as_str())
            .unwrap_or(&self.mail)
    }

    /// Mark the user as created and fill in the authed summary.
    ///
    /// `az_auth.old_authed` keeps the `authed` flag from before this call.
    pub fn mark_created(&mut self) {
        self.success = true;
        self.az_auth = AuthedData::from(&*self);
        self.authed = true;
    }
}

/// Condensed view of a created user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthedData {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(rename = "createdDateTime", default)]
    pub created_at: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub account_enabled: bool,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub old_authed: bool,
}

impl From<&AzUser> for AuthedData {
    fn from(user: &AzUser) -> Self {
        Self {
            success: user.success,
            surname: user.surname.clone(),
            telephone: user.telephone_number.clone(),
            created_at: user.created_date_time.clone(),
            given_name: user.given_name.clone(),
            account_enabled: user.account_enabled,
            email: user.email().to_string(),
            old_authed: user.authed,
        }
    }
}

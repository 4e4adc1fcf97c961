//! User records: the server's wire form and the client's projection.
//!
//! The backend speaks snake_case (`full_name`, `zip_code`), the rest of
//! the client speaks camelCase (`fullName`, `zipCode`). Rather than one
//! struct with conditional renames, there are two:
//!
//! - [`UserRecord`] is exactly what arrives in a response body.
//! - [`User`] is what the session holds and hands to screens.
//!
//! [`From<UserRecord>`](User#impl-From<UserRecord>-for-User) is the only
//! bridge, and it copies every field value-for-value.

use serde::{Deserialize, Serialize};

use crate::UserId;

// ---------------------------------------------------------------------------
// UserRecord
// ---------------------------------------------------------------------------

/// A user as serialized by the backend.
///
/// Optional fields use `#[serde(default)]` so an older server that omits
/// them still parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub phone_verified: Option<bool>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: Option<bool>,
    pub created_at: String,
    #[serde(default)]
    pub last_login: Option<String>,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// The authenticated user as the client sees it.
///
/// Read-only from the point of view of every component except the
/// session store. Timestamps stay opaque strings: the client displays
/// them, it never does arithmetic on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phone_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub profile_picture: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_verified: Option<bool>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_login: Option<String>,
}

impl User {
    /// Name to greet the user with: the full name, or the username when
    /// the full name is blank.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        // Exhaustive destructuring: adding a field to `UserRecord` without
        // mapping it here is a compile error.
        let UserRecord {
            id,
            email,
            username,
            full_name,
            phone_number,
            phone_verified,
            zip_code,
            city,
            state,
            bio,
            profile_picture,
            is_active,
            is_verified,
            created_at,
            last_login,
        } = record;

        Self {
            id,
            email,
            username,
            full_name,
            phone_number,
            phone_verified,
            zip_code,
            city,
            state,
            bio,
            profile_picture,
            is_active,
            is_verified,
            created_at,
            last_login,
        }
    }
}

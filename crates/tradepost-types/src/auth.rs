//! Request and response bodies for the authentication endpoints.
//!
//! Secrets (passwords, access tokens) get hand-written `Debug` impls
//! that redact them, so a stray `{:?}` in a log line can't leak one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::UserRecord;

const REDACTED: &str = "<redacted>";

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Body of `POST /api/auth/login`: `{"email": ..., "password": ...}`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// What a registration form collects.
///
/// This is the caller-facing shape. It is converted into a
/// [`RegisterRequest`] before it goes on the wire.
#[derive(Clone, Default)]
pub struct RegisterData {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl fmt::Debug for RegisterData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterData")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("password", &REDACTED)
            .field("phone_number", &self.phone_number)
            .field("zip_code", &self.zip_code)
            .field("city", &self.city)
            .field("state", &self.state)
            .finish()
    }
}

/// Body of `POST /api/auth/register`.
///
/// Optional contact fields are omitted from the JSON entirely when
/// absent, rather than sent as `null`.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state: Option<String>,
}

impl From<RegisterData> for RegisterRequest {
    fn from(data: RegisterData) -> Self {
        Self {
            email: data.email,
            username: data.username,
            full_name: data.full_name,
            password: data.password,
            phone_number: data.phone_number,
            zip_code: data.zip_code,
            city: data.city,
            state: data.state,
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &REDACTED)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Successful response from login or registration.
///
/// `user` is optional at the parsing level so that a response missing it
/// can be reported as a contract violation instead of a generic decode
/// failure. The session layer decides whether its absence is fatal.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("access_token", &REDACTED)
            .field("token_type", &self.token_type)
            .field("user", &self.user)
            .finish()
    }
}

/// Error envelope the backend returns on non-2xx responses:
/// `{"detail": "Incorrect email or password"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}

//! The authentication backend, seen from the client.
//!
//! The backend is an external collaborator: this crate describes what the
//! client needs from it and ships one implementation that talks HTTP.
//!
//! - [`AuthApi`]: exchange credentials or a registration form for an
//!   access token.
//! - [`TokenValidator`]: decide whether a persisted token still names a
//!   user. Kept separate from [`AuthApi`] so the validation strategy can
//!   be swapped without touching anything else.
//! - [`HttpAuthApi`]: reqwest implementation of both.
//!
//! # Feature Flags
//!
//! - `http` (default): [`HttpAuthApi`] via `reqwest`

mod config;
mod error;
#[cfg(feature = "http")]
mod http;

pub use config::ApiConfig;
pub use error::{ApiError, AuthErrorKind};
#[cfg(feature = "http")]
pub use http::HttpAuthApi;

use std::future::Future;

use tradepost_types::{AuthResponse, LoginRequest, RegisterRequest, User};

/// Path of the login endpoint, relative to the API base URL.
pub const LOGIN_PATH: &str = "/api/auth/login";
/// Path of the registration endpoint.
pub const REGISTER_PATH: &str = "/api/auth/register";
/// Path of the current-user endpoint used for token validation.
pub const CURRENT_USER_PATH: &str = "/api/users/me";

/// Credential exchange with the authentication backend.
///
/// Both methods resolve to the raw [`AuthResponse`]; deciding what a
/// response means for the session (persist the token, populate the user)
/// is the session layer's job.
///
/// `Send + Sync + 'static` because the session store that owns the API is
/// shared across tasks behind an `Arc`.
pub trait AuthApi: Send + Sync + 'static {
    /// Sends `{email, password}` to the login endpoint.
    ///
    /// # Errors
    /// Any non-2xx status, transport failure, or unparsable body.
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    /// Sends a registration form to the registration endpoint.
    ///
    /// # Errors
    /// Same as [`login`](Self::login).
    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;
}

/// Outcome of checking a persisted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The token is good and belongs to this user.
    Valid(User),

    /// The validator could not tell either way. The token is kept but no
    /// identity is established.
    Unverified,

    /// The backend says the token is invalid or expired.
    Rejected,
}

/// Checks a persisted credential token.
///
/// # Example
///
/// ```rust
/// use tradepost_api::{ApiError, TokenValidator, Validation};
///
/// /// Rejects everything. Handy for forcing a fresh login.
/// struct RejectAll;
///
/// impl TokenValidator for RejectAll {
///     async fn validate(&self, _token: &str) -> Result<Validation, ApiError> {
///         Ok(Validation::Rejected)
///     }
/// }
/// ```
pub trait TokenValidator: Send + Sync + 'static {
    /// Validates `token`.
    ///
    /// # Errors
    /// Transport or server failures. Callers treat these the same as
    /// [`Validation::Rejected`].
    fn validate(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Validation, ApiError>> + Send;
}

/// A validator that never contacts anyone and always answers
/// [`Validation::Unverified`].
///
/// For backends that have no validation endpoint yet: a stored token
/// survives reloads, but the user stays anonymous until they log in again.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderValidator;

impl TokenValidator for PlaceholderValidator {
    async fn validate(&self, _token: &str) -> Result<Validation, ApiError> {
        tracing::debug!("token validation not available, leaving unverified");
        Ok(Validation::Unverified)
    }
}

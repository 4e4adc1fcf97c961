//! Error types for the session layer.

use std::path::PathBuf;

use tradepost_api::{ApiError, AuthErrorKind};

/// Errors reading or writing the persisted credential token.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("token storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by [`SessionStore::login`](crate::SessionStore::login)
/// and [`SessionStore::register`](crate::SessionStore::register).
///
/// Whatever the variant, a failed call leaves the current user and the
/// persisted token exactly as they were.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The backend refused the call or could not be reached.
    #[error(transparent)]
    Auth(#[from] ApiError),

    /// The backend accepted the credentials but the token could not be
    /// persisted.
    #[error("could not persist credential token: {0}")]
    Storage(#[from] StorageError),

    /// The call did not finish within the configured request timeout.
    #[error("authentication request timed out")]
    Timeout,

    /// The store was disposed while the call was in flight (or before it
    /// started).
    #[error("session store has been disposed")]
    Cancelled,
}

impl SessionError {
    /// The authentication failure category, where one applies.
    ///
    /// Timeouts count as network errors. Storage failures and
    /// cancellation have no category: they are not the backend's answer.
    pub fn kind(&self) -> Option<AuthErrorKind> {
        match self {
            Self::Auth(e) => Some(e.kind()),
            Self::Timeout => Some(AuthErrorKind::NetworkError),
            Self::Storage(_) | Self::Cancelled => None,
        }
    }
}

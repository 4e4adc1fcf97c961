//! Error types for the backend layer.

/// Coarse category of an authentication failure, for callers that want
/// to branch (show "wrong password" vs. "try again later") without
/// matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    /// The backend refused the credentials (401/403).
    InvalidCredentials,
    /// The backend refused the request for another reason, such as an
    /// email that is already registered (other 4xx).
    Rejected,
    /// The backend could not be reached or did not answer in time.
    NetworkError,
    /// The backend failed or answered with something unusable.
    ServerError,
}

/// Errors talking to the authentication backend.
///
/// The variant is decided by what actually happened on the wire: the
/// HTTP status for answered requests, the transport for unanswered ones.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// 401 or 403.
    #[error("invalid credentials: {message}")]
    InvalidCredentials { status: u16, message: String },

    /// Any other 4xx.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// 5xx.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The request never got an answer: DNS, connect, TLS, reset.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// A 2xx response whose body breaks the agreed contract, e.g. a login
    /// response without the user record.
    #[error("unexpected response from server: {0}")]
    Contract(String),
}

impl ApiError {
    /// Builds the error for a non-2xx status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::InvalidCredentials { status, message },
            400..=499 => Self::Rejected { status, message },
            _ => Self::Server { status, message },
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            Self::InvalidCredentials { .. } => AuthErrorKind::InvalidCredentials,
            Self::Rejected { .. } => AuthErrorKind::Rejected,
            Self::Network(_) | Self::Timeout => AuthErrorKind::NetworkError,
            Self::Server { .. } | Self::Contract(_) => AuthErrorKind::ServerError,
        }
    }

    /// The HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidCredentials { status, .. }
            | Self::Rejected { status, .. }
            | Self::Server { status, .. } => Some(*status),
            Self::Network(_) | Self::Timeout | Self::Contract(_) => None,
        }
    }
}

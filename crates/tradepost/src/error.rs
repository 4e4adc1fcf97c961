//! Unified error type for the Tradepost client core.

use tradepost_api::ApiError;
use tradepost_gate::GateError;
use tradepost_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert layer errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Building the HTTP client, or a raw backend error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A login or registration that did not go through.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A navigation to a path that matches no screen.
    #[error(transparent)]
    Gate(#[from] GateError),
}

//! Error types for the gate layer.

/// Errors that can occur while resolving a navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// No screen is registered at this path. Includes item-detail paths
    /// whose id is not a number.
    #[error("no route matches {0}")]
    UnknownRoute(String),
}

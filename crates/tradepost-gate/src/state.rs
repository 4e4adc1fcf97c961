//! The access gate's state machine.

use std::fmt;

use tradepost_session::SessionSnapshot;

use crate::Route;

/// What a protected mount should be showing.
///
/// ```text
///              ┌──(!loading && user)──→ Authenticated
///  Checking ───┤                              │
///              └──(!loading && !user)──→ Redirecting ←┘ (session lost)
/// ```
///
/// - **Checking**: the session is still loading. Render nothing or a
///   neutral placeholder; never the screen, never a redirect.
/// - **Authenticated**: render the screen. Stays here while the session
///   is authenticated or loading.
/// - **Redirecting**: navigate to `to`, discarding the screen. Terminal
///   for this mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Checking,
    Authenticated,
    Redirecting {
        /// Where to navigate.
        to: Route,
        /// The protected route that was denied.
        from: Route,
    },
}

impl GateState {
    /// The state a fresh mount of `route` would settle on for `snapshot`.
    pub fn evaluate(snapshot: &SessionSnapshot, route: Route) -> Self {
        if snapshot.loading {
            Self::Checking
        } else if snapshot.is_authenticated() {
            Self::Authenticated
        } else {
            Self::Redirecting {
                to: Route::LOGIN_REDIRECT,
                from: route,
            }
        }
    }

    /// The state after observing `snapshot`.
    ///
    /// `Redirecting` never changes. `Authenticated` only gives way once
    /// loading has resolved with nobody logged in; a loading flicker while
    /// the user is still present doesn't unmount the screen.
    pub fn next(self, snapshot: &SessionSnapshot, route: Route) -> Self {
        match self {
            Self::Checking => Self::evaluate(snapshot, route),
            Self::Authenticated if snapshot.is_anonymous() => {
                Self::Redirecting {
                    to: Route::LOGIN_REDIRECT,
                    from: route,
                }
            }
            Self::Authenticated | Self::Redirecting { .. } => self,
        }
    }

    /// Returns `true` if the protected screen should be rendered.
    pub fn renders_screen(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Returns `true` once no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redirecting { .. })
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => write!(f, "Checking"),
            Self::Authenticated => write!(f, "Authenticated"),
            Self::Redirecting { to, from } => {
                write!(f, "Redirecting({from} -> {to})")
            }
        }
    }
}

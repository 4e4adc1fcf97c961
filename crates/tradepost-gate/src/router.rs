//! Path resolution with the gate applied.

use crate::{AccessGate, GateError, ProtectedMount, Route};

/// What to show for a navigation.
#[derive(Debug)]
pub enum Screen {
    /// A public screen: render it.
    Public(Route),

    /// A protected screen, wrapped in a gate mount. Render according to
    /// the mount's [`state`](ProtectedMount::state) and keep following it.
    Protected(ProtectedMount),
}

impl Screen {
    pub fn route(&self) -> Route {
        match self {
            Self::Public(route) => *route,
            Self::Protected(mount) => mount.route(),
        }
    }
}

/// Resolves paths to screens, putting protected ones behind the gate.
#[derive(Debug, Clone)]
pub struct Router {
    gate: AccessGate,
}

impl Router {
    pub fn new(gate: AccessGate) -> Self {
        Self { gate }
    }

    /// Opens the screen at `path`.
    ///
    /// # Errors
    /// [`GateError::UnknownRoute`] if the path matches no screen.
    pub fn open(&self, path: &str) -> Result<Screen, GateError> {
        let route = Route::parse(path)?;
        tracing::debug!(%route, protected = route.is_protected(), "navigate");

        if route.is_protected() {
            Ok(Screen::Protected(self.gate.mount(route)))
        } else {
            Ok(Screen::Public(route))
        }
    }
}

//! The reactive guard around protected screens.

use tradepost_session::{SessionSnapshot, SessionWatch};

use crate::{GateState, Route};

/// Hands out [`ProtectedMount`]s, all observing the same session.
#[derive(Debug, Clone)]
pub struct AccessGate {
    session: SessionWatch,
}

impl AccessGate {
    pub fn new(session: SessionWatch) -> Self {
        Self { session }
    }

    /// Mounts `route` behind the gate and evaluates it against the
    /// current session.
    pub fn mount(&self, route: Route) -> ProtectedMount {
        ProtectedMount::new(route, self.session.clone())
    }
}

/// One mounted protected screen.
///
/// Starts in [`GateState::Checking`] and follows the session from then
/// on: a logout elsewhere in the client turns a rendered screen into a
/// redirect without anybody navigating.
#[derive(Debug)]
pub struct ProtectedMount {
    route: Route,
    state: GateState,
    session: SessionWatch,
}

impl ProtectedMount {
    fn new(route: Route, session: SessionWatch) -> Self {
        let mut mount = Self {
            route,
            state: GateState::Checking,
            session,
        };
        mount.refresh();
        mount
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Re-evaluates against the latest session state.
    pub fn refresh(&mut self) -> GateState {
        let snapshot = self.session.latest();
        self.transition(&snapshot)
    }

    /// Waits for the session to change and re-evaluates.
    ///
    /// Returns immediately once the mount is redirecting. If the session
    /// store goes away the state is left as it is.
    pub async fn changed(&mut self) -> GateState {
        if self.state.is_terminal() {
            return self.state;
        }
        match self.session.changed().await {
            Some(snapshot) => self.transition(&snapshot),
            None => {
                tracing::debug!(route = %self.route, "session closed, gate frozen");
                self.state
            }
        }
    }

    /// Waits until the session has finished loading and the mount has
    /// left [`GateState::Checking`].
    ///
    /// Returns `Checking` only if the session store is dropped first.
    pub async fn settle(&mut self) -> GateState {
        while self.state == GateState::Checking {
            let Some(snapshot) = self.session.changed().await else {
                break;
            };
            self.transition(&snapshot);
        }
        self.state
    }

    fn transition(&mut self, snapshot: &SessionSnapshot) -> GateState {
        let next = self.state.next(snapshot, self.route);
        if next != self.state {
            tracing::debug!(route = %self.route, from = %self.state, to = %next, "gate transition");
            self.state = next;
        }
        self.state
    }
}

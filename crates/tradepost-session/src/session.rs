//! Session types: the configuration, the published state, and the
//! handle observers use to follow it.
//!
//! The store publishes its whole state as a single [`SessionSnapshot`].
//! Observers never see a half-applied update (a user without the loading
//! flag cleared, say), because both fields change in one send.

use std::time::Duration;

use tokio::sync::watch;
use tradepost_types::User;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Key the credential token is stored under.
    ///
    /// Default: `"authToken"`.
    pub storage_key: String,

    /// Deadline for each backend call the store makes (validate, login,
    /// register). Exceeding it fails the call with
    /// [`SessionError::Timeout`](crate::SessionError::Timeout).
    ///
    /// Default: 10 seconds.
    pub request_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: "authToken".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// The store's observable state at one point in time.
///
/// `user` and `loading` are the only two facts; "is authenticated" is
/// derived and cannot be set on its own.
///
/// ```text
///   loading=true, user=None   → not known yet (startup, or a call in flight)
///   loading=false, user=None  → logged out
///   loading=false, user=Some  → logged in
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Present iff a session is active.
    pub user: Option<User>,

    /// True until the startup restore attempt resolves, and again while a
    /// login or registration call is outstanding. While it is set, a
    /// missing user means "unknown", not "logged out".
    pub loading: bool,
}

impl SessionSnapshot {
    /// State of a freshly constructed store.
    pub fn initial() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// `true` once loading has resolved and nobody is logged in.
    pub fn is_anonymous(&self) -> bool {
        !self.loading && self.user.is_none()
    }
}

// ---------------------------------------------------------------------------
// SessionWatch
// ---------------------------------------------------------------------------

/// Read-only view of a [`SessionStore`](crate::SessionStore).
///
/// Obtained from [`SessionStore::subscribe`](crate::SessionStore::subscribe)
/// and handed to whatever needs to react to logins and logouts. Cloning
/// gives an independent cursor: each clone tracks on its own which
/// changes it has already seen.
#[derive(Debug, Clone)]
pub struct SessionWatch {
    rx: watch::Receiver<SessionSnapshot>,
}

impl SessionWatch {
    pub(crate) fn new(rx: watch::Receiver<SessionSnapshot>) -> Self {
        Self { rx }
    }

    /// The latest published state.
    pub fn current(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    /// The latest published state, marking it as seen so that
    /// [`changed`](Self::changed) only wakes for something newer.
    pub fn latest(&mut self) -> SessionSnapshot {
        self.rx.borrow_and_update().clone()
    }

    /// Waits for the next change and returns the new state.
    ///
    /// Returns `None` once the store has been dropped; nothing will ever
    /// change again.
    pub async fn changed(&mut self) -> Option<SessionSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits until `predicate` holds for the published state, returning
    /// that state. Resolves immediately if it already holds.
    ///
    /// Returns `None` if the store is dropped first.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Option<SessionSnapshot> {
        self.rx
            .wait_for(predicate)
            .await
            .ok()
            .map(|snapshot| snapshot.clone())
    }
}

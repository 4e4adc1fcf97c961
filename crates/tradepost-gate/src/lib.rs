//! Access control for the Tradepost client's screens.
//!
//! Screens that need a logged-in user are wrapped in an [`AccessGate`]
//! mount, which watches the session and decides, and keeps re-deciding,
//! whether to show the screen or send the user to the login page.
//!
//! # Key types
//!
//! - [`Route`]: every screen the client can show, and which are protected
//! - [`GateState`]: the per-mount state machine
//! - [`AccessGate`] / [`ProtectedMount`]: the reactive guard
//! - [`Router`] / [`Screen`]: path in, gated screen out

mod error;
mod gate;
mod route;
mod router;
mod state;

pub use error::GateError;
pub use gate::{AccessGate, ProtectedMount};
pub use route::Route;
pub use router::{Router, Screen};
pub use state::GateState;

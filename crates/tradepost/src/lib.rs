//! # Tradepost
//!
//! Session and access-control core for the Tradepost peer-to-peer
//! trading client.
//!
//! One [`MarketplaceClient`] per application run owns the session store.
//! Screens get what they need from it explicitly: the store for identity,
//! a [`Router`](tradepost_gate::Router) for gated navigation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tradepost::prelude::*;
//!
//! # async fn run() -> Result<(), ClientError> {
//! let client = MarketplaceClient::builder()
//!     .base_url("https://api.tradepost.example")
//!     .token_file("/tmp/tradepost-session.json")
//!     .build()?;
//! client.start().await;
//!
//! client.session().login("a@b.com", "pw").await?;
//! let screen = client.router().open("/dashboard")?;
//! # let _ = screen;
//! client.shutdown();
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{ClientBuilder, MarketplaceClient};
pub use error::ClientError;

pub mod prelude {
    //! The types most screens need, in one import.

    pub use crate::{ClientBuilder, ClientError, MarketplaceClient};
    pub use tradepost_api::{ApiConfig, ApiError, AuthErrorKind, Validation};
    pub use tradepost_gate::{
        AccessGate, GateState, ProtectedMount, Route, Router, Screen,
    };
    pub use tradepost_session::{
        SessionConfig, SessionError, SessionSnapshot, SessionWatch,
    };
    pub use tradepost_types::{ItemId, RegisterData, User, UserId};
}

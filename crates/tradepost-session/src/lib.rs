//! Client session management for Tradepost.
//!
//! This crate answers one question for the rest of the client: *who is
//! logged in?*
//!
//! 1. **Storage**: persisting the credential token across reloads
//!    ([`TokenStore`], [`MemoryTokenStore`], [`FileTokenStore`])
//! 2. **Lifecycle**: restoring, establishing and clearing a session
//!    ([`SessionStore`])
//! 3. **Observation**: letting other components react to changes
//!    ([`SessionWatch`], [`SessionSnapshot`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Gate layer (above)  ← watches snapshots to allow or redirect screens
//!     ↕
//! Session layer (this crate)  ← sole owner of the user and the token
//!     ↕
//! Api layer (below)  ← login/register/validate against the backend
//! ```

mod error;
mod session;
mod storage;
mod store;

pub use error::{SessionError, StorageError};
pub use session::{SessionConfig, SessionSnapshot, SessionWatch};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use store::SessionStore;

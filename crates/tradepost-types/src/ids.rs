//! Identity newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The backend's primary key for a user.
///
/// Newtype over `u64` so a `UserId` can never be passed where an
/// `ItemId` is expected. `#[serde(transparent)]` keeps the wire form a
/// bare number: `UserId(7)` is just `7` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// The backend's primary key for a listed item.
///
/// Items themselves are opaque to the client core; only the id shows up,
/// as the dynamic segment of the `/items/:id` route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I-{}", self.0)
    }
}

//! The client's route table.

use std::fmt;

use tradepost_types::ItemId;

use crate::GateError;

/// Every screen reachable by path.
///
/// ```text
/// /                 Home          public
/// /login            Login         public
/// /register         Register      public
/// /items            Items         public
/// /items/:id        ItemDetail    public
/// /dashboard        Dashboard     protected
/// /create-item      CreateItem    protected
/// /trades           Trades        protected
/// /profile          Profile       protected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Items,
    ItemDetail(ItemId),
    Dashboard,
    CreateItem,
    Trades,
    Profile,
}

impl Route {
    /// Where the gate sends anonymous users.
    pub const LOGIN_REDIRECT: Route = Route::Login;

    /// Resolves a browser-style path.
    ///
    /// A query string or fragment is ignored, as is one trailing slash.
    ///
    /// # Errors
    /// [`GateError::UnknownRoute`] for anything not in the table.
    pub fn parse(path: &str) -> Result<Self, GateError> {
        let unknown = || GateError::UnknownRoute(path.to_string());

        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        if !path.is_empty() && !path.starts_with('/') {
            return Err(unknown());
        }

        let route = match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["items"] => Self::Items,
            ["items", id] => {
                let id = id.parse::<u64>().map_err(|_| unknown())?;
                Self::ItemDetail(ItemId(id))
            }
            ["dashboard"] => Self::Dashboard,
            ["create-item"] => Self::CreateItem,
            ["trades"] => Self::Trades,
            ["profile"] => Self::Profile,
            _ => return Err(unknown()),
        };
        Ok(route)
    }

    /// Returns `true` if the screen needs an authenticated session.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Self::Dashboard | Self::CreateItem | Self::Trades | Self::Profile
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "/"),
            Self::Login => write!(f, "/login"),
            Self::Register => write!(f, "/register"),
            Self::Items => write!(f, "/items"),
            Self::ItemDetail(id) => write!(f, "/items/{}", id.0),
            Self::Dashboard => write!(f, "/dashboard"),
            Self::CreateItem => write!(f, "/create-item"),
            Self::Trades => write!(f, "/trades"),
            Self::Profile => write!(f, "/profile"),
        }
    }
}

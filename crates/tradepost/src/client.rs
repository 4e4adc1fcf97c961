//! `MarketplaceClient` builder and lifecycle.
//!
//! This is the application shell's entry point. It ties the layers
//! together: api → session → gate.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tradepost_api::{ApiConfig, HttpAuthApi, TokenValidator};
use tradepost_gate::{AccessGate, Router};
use tradepost_session::{
    FileTokenStore, MemoryTokenStore, SessionConfig, SessionStore, TokenStore,
};

use crate::ClientError;

/// Builder for configuring a [`MarketplaceClient`].
///
/// # Example
///
/// ```rust,ignore
/// let client = MarketplaceClient::builder()
///     .base_url("https://api.tradepost.example")
///     .request_timeout(Duration::from_secs(5))
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    api: ApiConfig,
    session: SessionConfig,
    token_file: Option<PathBuf>,
}

impl ClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend's base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.api.base_url = url.into();
        self
    }

    /// Sets the deadline for every backend call, both at the HTTP layer
    /// and in the session store.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.api.request_timeout = timeout;
        self.session.request_timeout = timeout;
        self
    }

    /// Sets the key the credential token is stored under.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.session.storage_key = key.into();
        self
    }

    /// Persists the credential token in this file. Without it the token
    /// lives in memory and is gone when the process exits.
    pub fn token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Builds a client that validates persisted tokens against the
    /// backend's current-user endpoint.
    ///
    /// # Errors
    /// [`ClientError::Api`] if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<MarketplaceClient, ClientError> {
        let api = HttpAuthApi::new(self.api.clone())?;
        let validator = api.clone();
        Ok(self.assemble(api, validator))
    }

    /// Builds a client with a custom token validator.
    ///
    /// # Errors
    /// [`ClientError::Api`] if the HTTP client cannot be constructed.
    pub fn build_with_validator<V: TokenValidator>(
        self,
        validator: V,
    ) -> Result<MarketplaceClient<V>, ClientError> {
        let api = HttpAuthApi::new(self.api.clone())?;
        Ok(self.assemble(api, validator))
    }

    fn assemble<V: TokenValidator>(
        self,
        api: HttpAuthApi,
        validator: V,
    ) -> MarketplaceClient<V> {
        let tokens: Arc<dyn TokenStore> = match self.token_file {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        tracing::debug!(base_url = %self.api.base_url, "marketplace client built");

        MarketplaceClient {
            session: Arc::new(SessionStore::new(
                api,
                validator,
                tokens,
                self.session,
            )),
        }
    }
}

/// The client core for one application run.
///
/// Explicitly constructed, explicitly started, explicitly shut down.
/// Hand [`session`](Self::session) or [`router`](Self::router) to
/// whatever needs identity or gated navigation.
pub struct MarketplaceClient<V: TokenValidator = HttpAuthApi> {
    session: Arc<SessionStore<HttpAuthApi, V>>,
}

impl MarketplaceClient {
    /// Creates a new builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<V: TokenValidator> MarketplaceClient<V> {
    /// Restores any persisted session. Call once, at startup.
    pub async fn start(&self) {
        self.session.initialize().await;
        tracing::info!(
            authenticated = self.session.is_authenticated(),
            "marketplace client started"
        );
    }

    /// The session store.
    pub fn session(&self) -> &Arc<SessionStore<HttpAuthApi, V>> {
        &self.session
    }

    /// An access gate observing this client's session.
    pub fn gate(&self) -> AccessGate {
        AccessGate::new(self.session.subscribe())
    }

    /// A router whose protected screens are gated by this client's
    /// session.
    pub fn router(&self) -> Router {
        Router::new(self.gate())
    }

    /// Disposes the session store, cancelling any call in flight.
    pub fn shutdown(&self) {
        self.session.dispose();
        tracing::info!("marketplace client shut down");
    }
}

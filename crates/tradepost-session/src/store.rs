//! The session store: the single owner of "who is logged in".
//!
//! Every other component reads the session through a [`SessionWatch`];
//! only this type writes the user or the persisted token.
//!
//! ```text
//! new() ──→ initialize() ──→ login() / register() ──→ logout()
//! [loading]  [restored | anonymous] [authenticated]    [anonymous]
//! ```
//!
//! Calls are not serialised. Two overlapping `login` calls both run and
//! whichever finishes last decides the user and the token. A restore that
//! is overtaken by a login, register or logout is discarded.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tradepost_api::{ApiError, AuthApi, TokenValidator, Validation};
use tradepost_types::{
    AuthResponse, LoginRequest, RegisterData, RegisterRequest, User,
};

use crate::{
    SessionConfig, SessionError, SessionSnapshot, SessionWatch, TokenStore,
};

/// Owns the current user and the persisted credential token.
///
/// Construct one per application run and pass it (usually in an `Arc`)
/// to whatever needs it. `A` performs login and registration, `V` checks
/// a persisted token at startup.
pub struct SessionStore<A, V> {
    api: A,
    validator: V,
    tokens: Arc<dyn TokenStore>,
    config: SessionConfig,
    state: watch::Sender<SessionSnapshot>,
    /// Flips to `true` exactly once, in [`dispose`](Self::dispose).
    disposed: watch::Sender<bool>,
    /// Counts committed logins, registrations and logouts. Held while a
    /// result is written so a restore can tell it has been overtaken.
    generation: Mutex<u64>,
    initialized: AtomicBool,
}

impl<A: AuthApi, V: TokenValidator> SessionStore<A, V> {
    /// Creates a store with `loading = true` and no user. Call
    /// [`initialize`](Self::initialize) next.
    pub fn new(
        api: A,
        validator: V,
        tokens: Arc<dyn TokenStore>,
        config: SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::initial());
        let (disposed, _) = watch::channel(false);
        Self {
            api,
            validator,
            tokens,
            config,
            state,
            disposed,
            generation: Mutex::new(0),
            initialized: AtomicBool::new(false),
        }
    }

    /// Restores the session from the persisted token, if there is one.
    ///
    /// - No token: anonymous, without a network call.
    /// - Accepted: the user is restored.
    /// - Unverified: the token is kept, the user stays unset.
    /// - Rejected, or validation failed: the token is erased.
    ///
    /// Never fails and always clears the loading flag. Only the first call
    /// does anything. If the session changes while validation is pending,
    /// the outcome is dropped and neither the user nor the token is touched.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            tracing::warn!("session store already initialized, ignoring");
            return;
        }

        let token = match self.tokens.load(&self.config.storage_key) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted token, starting anonymous");
                None
            }
        };

        let Some(token) = token else {
            tracing::debug!("no persisted token");
            self.resolve(None);
            return;
        };

        let started = *self.commit_lock();
        let outcome = self.guarded(self.validator.validate(&token)).await;

        let generation = self.commit_lock();
        if *generation != started {
            tracing::debug!("session changed during restore, discarding validation");
            self.state
                .send_if_modified(|s| std::mem::replace(&mut s.loading, false));
            return;
        }

        match outcome {
            Ok(Validation::Valid(user)) => {
                tracing::info!(user_id = %user.id, "session restored");
                self.resolve(Some(user));
            }
            Ok(Validation::Unverified) => {
                tracing::debug!("persisted token kept without validation");
                self.resolve(None);
            }
            Ok(Validation::Rejected) => {
                tracing::info!("persisted token rejected, clearing it");
                self.forget_token();
                self.resolve(None);
            }
            Err(SessionError::Cancelled) => {
                tracing::debug!("session restore cancelled");
            }
            Err(e) => {
                tracing::warn!(error = %e, "token validation failed, clearing token");
                self.forget_token();
                self.resolve(None);
            }
        }
    }

    /// Logs in with email and password.
    ///
    /// The backend must echo the full user record; a response without it
    /// is a contract error.
    ///
    /// # Errors
    /// Any [`SessionError`]. On error the user and the persisted token are
    /// untouched and the loading flag is cleared.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        let request = LoginRequest::new(email, password);
        self.authenticate("login", self.api.login(&request)).await
    }

    /// Registers a new account and logs it in.
    ///
    /// # Errors
    /// Same contract as [`login`](Self::login).
    pub async fn register(
        &self,
        data: RegisterData,
    ) -> Result<User, SessionError> {
        let request = RegisterRequest::from(data);
        self.authenticate("register", self.api.register(&request)).await
    }

    /// Erases the token and clears the user. Cannot fail; calling it while
    /// logged out notifies nobody.
    pub fn logout(&self) {
        let mut generation = self.commit_lock();
        self.forget_token();
        *generation += 1;
        let was_logged_in = self.state.send_if_modified(|s| s.user.take().is_some());
        if was_logged_in {
            tracing::info!("logged out");
        }
    }

    /// Ends the store's lifetime.
    ///
    /// Calls in flight resolve to [`SessionError::Cancelled`] without
    /// applying their result, later `login`/`register` calls fail the same
    /// way, and a pending loading flag is cleared.
    pub fn dispose(&self) {
        if self.disposed.send_replace(true) {
            return;
        }
        self.state.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
        tracing::debug!("session store disposed");
    }

    /// A handle that observes this store's state.
    pub fn subscribe(&self) -> SessionWatch {
        SessionWatch::new(self.state.subscribe())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Derived: `true` iff there is a current user.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_disposed(&self) -> bool {
        *self.disposed.borrow()
    }

    /// The persisted credential token, for attaching to other API calls.
    pub fn credential_token(&self) -> Option<String> {
        self.tokens
            .load(&self.config.storage_key)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not read persisted token");
                None
            })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn authenticate(
        &self,
        action: &'static str,
        call: impl Future<Output = Result<AuthResponse, ApiError>>,
    ) -> Result<User, SessionError> {
        if self.is_disposed() {
            return Err(SessionError::Cancelled);
        }

        self.state.send_modify(|s| s.loading = true);

        match self.establish(call).await {
            Ok(user) => {
                tracing::info!(action, user_id = %user.id, "authenticated");
                Ok(user)
            }
            Err(e) => {
                self.state.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
                tracing::warn!(action, error = %e, "authentication failed");
                Err(e)
            }
        }
    }

    /// Runs the backend call and, only if everything succeeds, persists
    /// the token and publishes the user in one step.
    async fn establish(
        &self,
        call: impl Future<Output = Result<AuthResponse, ApiError>>,
    ) -> Result<User, SessionError> {
        let response = self.guarded(call).await?;

        let record = response.user.ok_or_else(|| {
            ApiError::Contract("response did not include the user record".into())
        })?;
        let user = User::from(record);

        // A dispose that landed while the response was being read wins.
        if self.is_disposed() {
            return Err(SessionError::Cancelled);
        }

        let mut generation = self.commit_lock();
        self.tokens
            .save(&self.config.storage_key, &response.access_token)?;
        *generation += 1;
        self.state.send_modify(|s| {
            s.user = Some(user.clone());
            s.loading = false;
        });
        Ok(user)
    }

    /// Applies the request timeout and races the call against
    /// [`dispose`](Self::dispose).
    async fn guarded<T>(
        &self,
        call: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, SessionError> {
        let mut disposed = self.disposed.subscribe();
        if *disposed.borrow_and_update() {
            return Err(SessionError::Cancelled);
        }

        tokio::select! {
            biased;
            () = until_disposed(disposed) => Err(SessionError::Cancelled),
            outcome = tokio::time::timeout(self.config.request_timeout, call) => {
                match outcome {
                    Ok(result) => result.map_err(SessionError::from),
                    Err(_) => Err(SessionError::Timeout),
                }
            }
        }
    }

    fn commit_lock(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self, user: Option<User>) {
        self.state.send_modify(|s| {
            s.user = user;
            s.loading = false;
        });
    }

    fn forget_token(&self) {
        if let Err(e) = self.tokens.clear(&self.config.storage_key) {
            tracing::warn!(error = %e, "could not remove persisted token");
        }
    }
}

/// Resolves once the store is disposed (or dropped).
async fn until_disposed(mut disposed: watch::Receiver<bool>) {
    let _ = disposed.wait_for(|d| *d).await;
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionStore`, driven by in-process test doubles.
    //!
    //! Naming: `test_{function}_{scenario}_{expected}`.
    //!
    //! Slow backends are simulated with a future that never resolves, and
    //! the store is configured with a short timeout, so nothing here
    //! actually sleeps for long.

    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::sync::Notify;

    use tradepost_api::AuthErrorKind;
    use tradepost_types::{UserId, UserRecord};

    use super::*;
    use crate::MemoryTokenStore;

    const KEY: &str = "authToken";

    // -- Test doubles -----------------------------------------------------

    #[derive(Clone)]
    struct FakeApi {
        reply: Result<AuthResponse, ApiError>,
        hang: bool,
        calls: Arc<AtomicUsize>,
    }

    impl FakeApi {
        fn replying(reply: Result<AuthResponse, ApiError>) -> Self {
            Self {
                reply,
                hang: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn hanging() -> Self {
            Self {
                hang: true,
                ..Self::replying(Err(ApiError::Timeout))
            }
        }

        async fn respond(&self) -> Result<AuthResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.reply.clone()
        }
    }

    impl AuthApi for FakeApi {
        async fn login(
            &self,
            _request: &LoginRequest,
        ) -> Result<AuthResponse, ApiError> {
            self.respond().await
        }

        async fn register(
            &self,
            _request: &RegisterRequest,
        ) -> Result<AuthResponse, ApiError> {
            self.respond().await
        }
    }

    struct FakeValidator {
        outcome: Result<Validation, ApiError>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeValidator {
        fn answering(outcome: Result<Validation, ApiError>) -> Self {
            Self {
                outcome,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl TokenValidator for FakeValidator {
        async fn validate(&self, _token: &str) -> Result<Validation, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    /// Signals `entered` when validation starts, then holds the answer
    /// until `release` fires.
    struct GatedValidator {
        entered: Arc<Notify>,
        release: Arc<Notify>,
        outcome: Result<Validation, ApiError>,
    }

    impl GatedValidator {
        fn answering(outcome: Result<Validation, ApiError>) -> Self {
            Self {
                entered: Arc::new(Notify::new()),
                release: Arc::new(Notify::new()),
                outcome,
            }
        }
    }

    impl TokenValidator for GatedValidator {
        async fn validate(&self, _token: &str) -> Result<Validation, ApiError> {
            self.entered.notify_one();
            self.release.notified().await;
            self.outcome.clone()
        }
    }

    // -- Helpers ----------------------------------------------------------

    fn record(id: u64, email: &str) -> UserRecord {
        UserRecord {
            id: UserId(id),
            email: email.to_string(),
            username: email.split('@').next().unwrap_or_default().to_string(),
            full_name: "Test User".to_string(),
            phone_number: None,
            phone_verified: None,
            zip_code: Some("10001".to_string()),
            city: Some("New York".to_string()),
            state: Some("NY".to_string()),
            bio: None,
            profile_picture: None,
            is_active: true,
            is_verified: Some(false),
            created_at: "2024-01-01T00:00:00".to_string(),
            last_login: None,
        }
    }

    fn granted(token: &str, user: UserRecord) -> Result<AuthResponse, ApiError> {
        Ok(AuthResponse {
            access_token: token.to_string(),
            token_type: Some("bearer".to_string()),
            user: Some(user),
        })
    }

    fn config() -> SessionConfig {
        SessionConfig {
            request_timeout: Duration::from_millis(100),
            ..SessionConfig::default()
        }
    }

    fn store_with(
        api: FakeApi,
        validator: FakeValidator,
        tokens: Arc<MemoryTokenStore>,
    ) -> SessionStore<FakeApi, FakeValidator> {
        SessionStore::new(api, validator, tokens, config())
    }

    /// A store that has finished initializing with no persisted token.
    async fn anonymous_store(
        api: FakeApi,
    ) -> (SessionStore<FakeApi, FakeValidator>, Arc<MemoryTokenStore>) {
        let tokens = Arc::new(MemoryTokenStore::new());
        let store = store_with(
            api,
            FakeValidator::answering(Ok(Validation::Rejected)),
            Arc::clone(&tokens),
        );
        store.initialize().await;
        (store, tokens)
    }

    // =====================================================================
    // new()
    // =====================================================================

    #[test]
    fn test_new_starts_loading_without_user() {
        let store = store_with(
            FakeApi::hanging(),
            FakeValidator::answering(Ok(Validation::Rejected)),
            Arc::new(MemoryTokenStore::new()),
        );

        assert!(store.is_loading());
        assert!(!store.is_authenticated());
    }

    // =====================================================================
    // initialize()
    // =====================================================================

    #[tokio::test]
    async fn test_initialize_no_token_resolves_anonymous_without_network() {
        let validator = FakeValidator::answering(Ok(Validation::Rejected));
        let calls = Arc::clone(&validator.calls);
        let store = store_with(
            FakeApi::hanging(),
            validator,
            Arc::new(MemoryTokenStore::new()),
        );

        store.initialize().await;

        assert!(!store.is_loading());
        assert_eq!(store.current_user(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0, "no validation call");
    }

    #[tokio::test]
    async fn test_initialize_valid_token_restores_user() {
        let user = User::from(record(3, "c@d.com"));
        let validator =
            FakeValidator::answering(Ok(Validation::Valid(user.clone())));
        let calls = Arc::clone(&validator.calls);
        let tokens = Arc::new(MemoryTokenStore::with_token(KEY, "T"));
        let store = store_with(FakeApi::hanging(), validator, Arc::clone(&tokens));

        store.initialize().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1, "exactly one validation");
        assert!(!store.is_loading());
        assert_eq!(store.current_user(), Some(user));
        assert_eq!(tokens.load(KEY).unwrap().as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn test_initialize_rejected_token_clears_storage() {
        let tokens = Arc::new(MemoryTokenStore::with_token(KEY, "stale"));
        let store = store_with(
            FakeApi::hanging(),
            FakeValidator::answering(Ok(Validation::Rejected)),
            Arc::clone(&tokens),
        );

        store.initialize().await;

        assert!(!store.is_loading());
        assert!(!store.is_authenticated());
        assert_eq!(tokens.load(KEY).unwrap(), None, "token should be erased");
    }

    #[tokio::test]
    async fn test_initialize_validation_network_error_clears_storage() {
        // A failed validation is "not authenticated", never fatal.
        let tokens = Arc::new(MemoryTokenStore::with_token(KEY, "T"));
        let store = store_with(
            FakeApi::hanging(),
            FakeValidator::answering(Err(ApiError::Network("refused".into()))),
            Arc::clone(&tokens),
        );

        store.initialize().await;

        assert!(!store.is_loading());
        assert!(!store.is_authenticated());
        assert_eq!(tokens.load(KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_initialize_unverified_token_is_kept_without_user() {
        let tokens = Arc::new(MemoryTokenStore::with_token(KEY, "T"));
        let store = store_with(
            FakeApi::hanging(),
            FakeValidator::answering(Ok(Validation::Unverified)),
            Arc::clone(&tokens),
        );

        store.initialize().await;

        assert!(!store.is_loading());
        assert!(!store.is_authenticated());
        assert_eq!(store.credential_token().as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn test_initialize_second_call_is_noop() {
        let validator = FakeValidator::answering(Ok(Validation::Unverified));
        let calls = Arc::clone(&validator.calls);
        let tokens = Arc::new(MemoryTokenStore::with_token(KEY, "T"));
        let store = store_with(FakeApi::hanging(), validator, tokens);

        store.initialize().await;
        store.initialize().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Starts `initialize` on a task and waits until validation is pending.
    async fn restore_in_background(
        api: FakeApi,
        validator: GatedValidator,
        tokens: Arc<MemoryTokenStore>,
    ) -> (
        Arc<SessionStore<FakeApi, GatedValidator>>,
        Arc<Notify>,
        tokio::task::JoinHandle<()>,
    ) {
        let entered = Arc::clone(&validator.entered);
        let release = Arc::clone(&validator.release);
        let config = SessionConfig {
            request_timeout: Duration::from_secs(5),
            ..config()
        };
        let store = Arc::new(SessionStore::new(api, validator, tokens, config));
        let restore = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.initialize().await }
        });
        entered.notified().await;
        (store, release, restore)
    }

    #[tokio::test]
    async fn test_initialize_stale_rejection_after_login_keeps_new_session() {
        let tokens = Arc::new(MemoryTokenStore::with_token(KEY, "STALE"));
        let (store, release, restore) = restore_in_background(
            FakeApi::replying(granted("FRESH", record(1, "a@b.com"))),
            GatedValidator::answering(Ok(Validation::Rejected)),
            Arc::clone(&tokens),
        )
        .await;

        store.login("a@b.com", "pw").await.unwrap();
        release.notify_one();
        restore.await.unwrap();

        assert!(store.is_authenticated());
        assert!(!store.is_loading());
        assert_eq!(tokens.load(KEY).unwrap().as_deref(), Some("FRESH"));
    }

    #[tokio::test]
    async fn test_initialize_stale_unverified_after_login_keeps_user() {
        let tokens = Arc::new(MemoryTokenStore::with_token(KEY, "STALE"));
        let (store, release, restore) = restore_in_background(
            FakeApi::replying(granted("FRESH", record(1, "a@b.com"))),
            GatedValidator::answering(Ok(Validation::Unverified)),
            Arc::clone(&tokens),
        )
        .await;

        let user = store.login("a@b.com", "pw").await.unwrap();
        release.notify_one();
        restore.await.unwrap();

        assert_eq!(store.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_initialize_valid_answer_after_logout_stays_logged_out() {
        let tokens = Arc::new(MemoryTokenStore::with_token(KEY, "T"));
        let (store, release, restore) = restore_in_background(
            FakeApi::hanging(),
            GatedValidator::answering(Ok(Validation::Valid(User::from(
                record(3, "c@d.com"),
            )))),
            Arc::clone(&tokens),
        )
        .await;

        store.logout();
        release.notify_one();
        restore.await.unwrap();

        assert!(!store.is_authenticated());
        assert!(!store.is_loading(), "restore must still settle loading");
        assert_eq!(tokens.load(KEY).unwrap(), None);
    }

    // =====================================================================
    // login()
    // =====================================================================

    #[tokio::test]
    async fn test_login_success_persists_token_and_sets_user() {
        let (store, tokens) =
            anonymous_store(FakeApi::replying(granted("T", record(1, "a@b.com"))))
                .await;

        let user = store.login("a@b.com", "pw").await.expect("should succeed");

        assert_eq!(user.email, "a@b.com");
        assert!(store.is_authenticated());
        assert!(!store.is_loading());
        assert_eq!(tokens.load(KEY).unwrap().as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn test_login_401_rejects_without_mutation() {
        let (store, tokens) = anonymous_store(FakeApi::replying(Err(
            ApiError::from_status(401, "Incorrect email or password"),
        )))
        .await;

        let err = store.login("a@b.com", "wrong").await.unwrap_err();

        assert_eq!(err.kind(), Some(AuthErrorKind::InvalidCredentials));
        assert_eq!(store.current_user(), None);
        assert!(!store.is_loading());
        assert_eq!(tokens.load(KEY).unwrap(), None, "no token persisted");
    }

    #[tokio::test]
    async fn test_login_response_without_user_is_contract_error() {
        let (store, tokens) = anonymous_store(FakeApi::replying(Ok(AuthResponse {
            access_token: "T".into(),
            token_type: None,
            user: None,
        })))
        .await;

        let err = store.login("a@b.com", "pw").await.unwrap_err();

        assert!(
            matches!(err, SessionError::Auth(ApiError::Contract(_))),
            "got {err:?}"
        );
        assert!(!store.is_authenticated());
        assert_eq!(tokens.load(KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_failure_keeps_previous_session() {
        // Failure must not clobber an existing login.
        let api = FakeApi::replying(granted("T1", record(1, "a@b.com")));
        let (mut store, tokens) = anonymous_store(api).await;
        store.login("a@b.com", "pw").await.unwrap();

        store.api = FakeApi::replying(Err(ApiError::from_status(500, "boom")));
        let err = store.login("x@y.com", "pw").await.unwrap_err();

        assert_eq!(err.kind(), Some(AuthErrorKind::ServerError));
        assert_eq!(store.current_user().map(|u| u.id), Some(UserId(1)));
        assert_eq!(tokens.load(KEY).unwrap().as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn test_login_slow_backend_times_out() {
        let (store, tokens) = anonymous_store(FakeApi::hanging()).await;

        let err = store.login("a@b.com", "pw").await.unwrap_err();

        assert!(matches!(err, SessionError::Timeout));
        assert_eq!(err.kind(), Some(AuthErrorKind::NetworkError));
        assert!(!store.is_loading());
        assert_eq!(tokens.load(KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_sets_loading_while_in_flight() {
        let tokens = Arc::new(MemoryTokenStore::new());
        let store = Arc::new(SessionStore::new(
            FakeApi::hanging(),
            FakeValidator::answering(Ok(Validation::Rejected)),
            tokens,
            SessionConfig {
                request_timeout: Duration::from_secs(30),
                ..SessionConfig::default()
            },
        ));
        store.initialize().await;
        let mut watch = store.subscribe();

        let task = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.login("a@b.com", "pw").await })
        };

        let snapshot = watch.wait_for(|s| s.loading).await.unwrap();
        assert!(!snapshot.is_authenticated());

        store.dispose();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(SessionError::Cancelled)));
        assert!(!store.is_loading(), "dispose clears a pending loading flag");
    }

    // =====================================================================
    // register()
    // =====================================================================

    #[tokio::test]
    async fn test_register_success_populates_full_projection() {
        let source = record(9, "new@b.com");
        let (store, tokens) =
            anonymous_store(FakeApi::replying(granted("R", source.clone()))).await;

        let user = store
            .register(RegisterData {
                email: "new@b.com".into(),
                username: "new".into(),
                full_name: "Test User".into(),
                password: "pw".into(),
                ..RegisterData::default()
            })
            .await
            .expect("should succeed");

        assert_eq!(user, User::from(source));
        assert_eq!(user.zip_code.as_deref(), Some("10001"));
        assert_eq!(tokens.load(KEY).unwrap().as_deref(), Some("R"));
    }

    #[tokio::test]
    async fn test_register_rejected_leaves_state_untouched() {
        let (store, tokens) = anonymous_store(FakeApi::replying(Err(
            ApiError::from_status(400, "Email already registered"),
        )))
        .await;

        let err = store.register(RegisterData::default()).await.unwrap_err();

        assert_eq!(err.kind(), Some(AuthErrorKind::Rejected));
        assert!(err.to_string().contains("Email already registered"));
        assert!(!store.is_authenticated());
        assert!(!store.is_loading());
        assert_eq!(tokens.load(KEY).unwrap(), None);
    }

    // =====================================================================
    // logout()
    // =====================================================================

    #[tokio::test]
    async fn test_logout_clears_user_and_token() {
        let (store, tokens) =
            anonymous_store(FakeApi::replying(granted("T", record(1, "a@b.com"))))
                .await;
        store.login("a@b.com", "pw").await.unwrap();

        store.logout();

        assert!(!store.is_authenticated());
        assert_eq!(tokens.load(KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_logout_when_anonymous_is_noop() {
        let (store, tokens) = anonymous_store(FakeApi::hanging()).await;
        let before = store.snapshot();
        let mut watch = store.subscribe();

        store.logout();
        store.logout();

        assert_eq!(store.snapshot(), before);
        assert_eq!(tokens.load(KEY).unwrap(), None);
        let notified = tokio::time::timeout(Duration::from_millis(20), watch.changed()).await;
        assert!(notified.is_err(), "no change should be published");
    }

    #[tokio::test]
    async fn test_logout_twice_equals_once() {
        let (store, _tokens) =
            anonymous_store(FakeApi::replying(granted("T", record(1, "a@b.com"))))
                .await;
        store.login("a@b.com", "pw").await.unwrap();

        store.logout();
        let once = store.snapshot();
        store.logout();

        assert_eq!(store.snapshot(), once);
    }

    // =====================================================================
    // dispose()
    // =====================================================================

    #[tokio::test]
    async fn test_dispose_then_login_is_cancelled() {
        let (store, tokens) =
            anonymous_store(FakeApi::replying(granted("T", record(1, "a@b.com"))))
                .await;

        store.dispose();
        let result = store.login("a@b.com", "pw").await;

        assert!(matches!(result, Err(SessionError::Cancelled)));
        assert!(!store.is_authenticated());
        assert_eq!(tokens.load(KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_dispose_during_initialize_clears_loading() {
        struct HangingValidator;
        impl TokenValidator for HangingValidator {
            async fn validate(&self, _token: &str) -> Result<Validation, ApiError> {
                std::future::pending().await
            }
        }

        let tokens = Arc::new(MemoryTokenStore::with_token(KEY, "T"));
        let store = Arc::new(SessionStore::new(
            FakeApi::hanging(),
            HangingValidator,
            Arc::clone(&tokens) as Arc<dyn TokenStore>,
            SessionConfig::default(),
        ));

        let task = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.initialize().await })
        };
        tokio::task::yield_now().await;
        store.dispose();
        task.await.unwrap();

        assert!(!store.is_loading());
        assert_eq!(
            tokens.load(KEY).unwrap().as_deref(),
            Some("T"),
            "a cancelled restore must not erase the token"
        );
    }
}

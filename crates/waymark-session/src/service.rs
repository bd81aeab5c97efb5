//! The session service: bootstrap, reconciliation, refresh, and logout.

use crate::bus::{SessionBus, SessionEvent};
use crate::collaborators::{
    ExternalSignOut, Navigator, Notice, NotificationSink, ProviderSnapshot, ProviderStatus,
    SessionProvider,
};
use crate::error::SessionError;
use crate::state::{SessionInput, SessionMachine, SessionState};
use crate::transport::AuthTransport;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use waymark_storage::SessionStore;
use waymark_token::{
    is_expired, schedule_refresh, RefreshHandle, DEFAULT_EXPIRY_BUFFER_SECS,
    DEFAULT_REFRESH_THRESHOLD,
};

/// Callback type for session state change notifications.
pub type StateCallback = Box<dyn Fn(SessionState) + Send + Sync>;

/// Session service.
///
/// Owns the machine that converges three sources of identity state — the
/// persistent store, the in-memory user, and the external session provider —
/// to one consistent `SessionState`. The UI layer reads state from here and
/// never touches the store directly.
///
/// Reconciliation passes are not serialized against each other; every
/// action is idempotent, but overlapping refresh exchanges are not
/// deduplicated (each pass re-reads the store before acting, so the last
/// write wins).
pub struct SessionService {
    store: SessionStore,
    transport: Arc<dyn AuthTransport>,
    sign_out: Arc<dyn ExternalSignOut>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn NotificationSink>,
    bus: SessionBus,
    /// Internal machine tracking the session lifecycle.
    machine: Mutex<SessionMachine>,
    /// In-memory user profile (parsed).
    user: Mutex<Option<Value>>,
    /// Set once the first effective reconciliation pass completes.
    bootstrapped: AtomicBool,
    /// Currently armed proactive refresh timer.
    refresh_timer: Mutex<Option<RefreshHandle>>,
    /// Optional observer for state changes.
    state_callback: Mutex<Option<StateCallback>>,
    /// Self-reference handed to the refresh timer so the rescheduling chain
    /// never keeps a logged-out service alive.
    weak_self: Weak<SessionService>,
}

impl SessionService {
    /// Create a new session service.
    pub fn new(
        store: SessionStore,
        transport: Arc<dyn AuthTransport>,
        sign_out: Arc<dyn ExternalSignOut>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn NotificationSink>,
        bus: SessionBus,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            store,
            transport,
            sign_out,
            navigator,
            notifier,
            bus,
            machine: Mutex::new(SessionMachine::new()),
            user: Mutex::new(None),
            bootstrapped: AtomicBool::new(false),
            refresh_timer: Mutex::new(None),
            state_callback: Mutex::new(None),
            weak_self: weak_self.clone(),
        })
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        let machine = self.machine.lock().unwrap();
        SessionState::from(machine.state())
    }

    /// Current in-memory user profile, if any.
    pub fn current_user(&self) -> Option<Value> {
        self.user.lock().unwrap().clone()
    }

    /// Whether the bootstrap pass has completed.
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped.load(Ordering::SeqCst)
    }

    /// The bus this service listens on.
    pub fn bus(&self) -> &SessionBus {
        &self.bus
    }

    /// Set a callback to be notified of state changes.
    pub fn set_state_callback(&self, callback: StateCallback) {
        let mut cb = self.state_callback.lock().unwrap();
        *cb = Some(callback);
    }

    /// Transition the machine and notify the callback if the state changed.
    fn transition(&self, input: &SessionInput) -> Result<SessionState, SessionError> {
        let mut machine = self.machine.lock().unwrap();
        let old_state = SessionState::from(machine.state());

        machine.consume(input).map_err(|_| {
            SessionError::InvalidTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                machine.state()
            ))
        })?;

        let new_state = SessionState::from(machine.state());
        drop(machine);

        if old_state != new_state {
            debug!(?old_state, ?new_state, "Session state transition");
            let cb = self.state_callback.lock().unwrap();
            if let Some(callback) = cb.as_ref() {
                callback(new_state);
            }
        }

        Ok(new_state)
    }

    /// Surface an error through the notification sink with its category.
    fn report(&self, error: &SessionError) {
        warn!(%error, category = %error.category(), "Session error");
        self.notifier
            .publish(Notice::error(error.to_string(), error.category()));
    }

    fn install_profile(&self, profile: Value) {
        *self.user.lock().unwrap() = Some(profile);
        let _ = self.transition(&SessionInput::ProfileLoaded);
    }

    fn clear_user(&self) {
        *self.user.lock().unwrap() = None;
    }

    /// Run the event loop: reconcile on every provider change, adopt the
    /// stored profile on every cross-instance event.
    pub async fn run(self: Arc<Self>, provider: &dyn SessionProvider) {
        let mut updates = provider.observe();
        let mut events = self.bus.subscribe();

        let snapshot = updates.borrow().clone();
        self.reconcile(&snapshot).await;

        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = updates.borrow_and_update().clone();
                    self.reconcile(&snapshot).await;
                }
                event = events.recv() => {
                    match event {
                        Ok(SessionEvent::ProfileChanged) => self.adopt_stored_profile(),
                        // Dropped events all mean the same thing here:
                        // re-read the profile.
                        Err(RecvError::Lagged(_)) => self.adopt_stored_profile(),
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        }

        self.cancel_refresh();
    }

    /// One reconciliation pass against a provider snapshot.
    ///
    /// A no-op while the provider itself is still loading. Otherwise the
    /// store is re-read fresh and the priority-ordered decision runs; every
    /// branch is terminal for the pass.
    pub async fn reconcile(&self, snapshot: &ProviderSnapshot) {
        if snapshot.status == ProviderStatus::Loading {
            return;
        }

        if !self.bootstrapped.load(Ordering::SeqCst) {
            let _ = self.transition(&SessionInput::BootstrapStarted);
        }

        if let Err(error) = self.reconcile_inner(snapshot).await {
            self.report(&error);
        }

        self.finish_bootstrap();
    }

    async fn reconcile_inner(&self, snapshot: &ProviderSnapshot) -> Result<(), SessionError> {
        let access_token = self.store.access_token()?;
        let refresh_token = self.store.refresh_token()?;
        let stored_profile = self.store.user_profile_raw()?;
        let has_user = self.user.lock().unwrap().is_some();

        // 1. Locally persisted access token has expired.
        if let Some(token) = access_token.as_deref() {
            if is_expired(token, DEFAULT_EXPIRY_BUFFER_SECS) {
                if refresh_token.is_none() {
                    self.report(&SessionError::NoRefreshToken);
                    self.logout().await;
                    return Ok(());
                }

                let Ok(new_access) = self.refresh_session().await else {
                    // refresh_session already reported and logged out.
                    return Ok(());
                };

                match stored_profile {
                    Some(raw) => match serde_json::from_str::<Value>(&raw) {
                        Ok(profile) => self.install_profile(profile),
                        Err(parse_error) => {
                            // Recoverable: refetch before giving up.
                            self.report(&SessionError::ProfileParse(parse_error.to_string()));
                            self.refetch_profile_or_logout(&new_access).await;
                        }
                    },
                    None => self.refetch_profile_or_logout(&new_access).await,
                }
                return Ok(());
            }
        }

        // 2. External session carries tokens we have not adopted yet.
        if snapshot.status == ProviderStatus::Authenticated && access_token.is_none() {
            if let Some(tokens) = &snapshot.tokens {
                self.store.set_access_token(&tokens.access_token)?;
                if let Some(refresh) = &tokens.refresh_token {
                    self.store.set_refresh_token(refresh)?;
                }
                info!("Adopted external session tokens");

                match &snapshot.profile {
                    Some(profile) => {
                        self.store.set_user_profile(profile)?;
                        self.install_profile(profile.clone());
                    }
                    None => {
                        if let Err(error) =
                            self.fetch_user_profile(Some(&tokens.access_token)).await
                        {
                            // Bootstrap is fail-closed on profile errors.
                            self.report(&error);
                            self.logout().await;
                            return Ok(());
                        }
                    }
                }
                self.arm_refresh_from_store();
                return Ok(());
            }
        }

        // 3. Valid local token but no user in memory.
        if access_token.is_some() && !has_user {
            let recovered = match stored_profile {
                Some(raw) => match serde_json::from_str::<Value>(&raw) {
                    Ok(profile) => {
                        self.install_profile(profile);
                        true
                    }
                    Err(parse_error) => {
                        self.report(&SessionError::ProfileParse(parse_error.to_string()));
                        false
                    }
                },
                None => false,
            };

            if !recovered {
                if let Err(error) = self.fetch_user_profile(None).await {
                    self.report(&error);
                    self.store.clear_session()?;
                    self.clear_user();
                    let _ = self.transition(&SessionInput::SessionCleared);
                    return Ok(());
                }
            }
            self.arm_refresh_from_store();
            return Ok(());
        }

        // 4. Explicit empty state; not an error.
        if access_token.is_none() && !has_user {
            let _ = self.transition(&SessionInput::SessionCleared);
            return Ok(());
        }

        // 5. Already consistent.
        debug!("Session state already consistent");
        Ok(())
    }

    async fn refetch_profile_or_logout(&self, access_token: &str) {
        if let Err(error) = self.fetch_user_profile(Some(access_token)).await {
            self.report(&error);
            self.logout().await;
        }
    }

    /// Set the bootstrap-complete flag and clear the Loading state, exactly
    /// once.
    fn finish_bootstrap(&self) {
        if !self.bootstrapped.swap(true, Ordering::SeqCst) {
            // A pass that ended in a controlled failure may not have settled
            // the machine; an unsettled bootstrap resolves to empty.
            if self.state() == SessionState::Loading {
                let _ = self.transition(&SessionInput::SessionCleared);
            }
            debug!("Session bootstrap complete");
        }
    }

    /// Perform one refresh-token exchange and re-arm the refresh timer with
    /// this method as the callback (self-rescheduling chain).
    ///
    /// On failure the session is torn down: token-category error, then
    /// logout.
    pub async fn refresh_session(&self) -> Result<String, SessionError> {
        match self.try_refresh().await {
            Ok(access_token) => {
                self.arm_refresh(&access_token);
                Ok(access_token)
            }
            Err(error) => {
                self.report(&error);
                self.logout().await;
                Err(error)
            }
        }
    }

    async fn try_refresh(&self) -> Result<String, SessionError> {
        let refresh_token = self
            .store
            .refresh_token()?
            .ok_or(SessionError::NoRefreshToken)?;

        let pair = self
            .transport
            .exchange_refresh_token(&refresh_token)
            .await
            .map_err(|error| SessionError::RefreshFailed(error.to_string()))?;

        self.store.set_access_token(&pair.access_token)?;
        if let Some(rotated) = &pair.refresh_token {
            self.store.set_refresh_token(rotated)?;
        }

        info!("Access token refreshed");
        Ok(pair.access_token)
    }

    /// Fetch the signed-in user's profile, persist it, and update the
    /// in-memory user.
    ///
    /// Uses the stored access token unless an override is given. Fails with
    /// an api-category error when no token is available or when the server
    /// returns an empty response.
    pub async fn fetch_user_profile(
        &self,
        token_override: Option<&str>,
    ) -> Result<Value, SessionError> {
        let token = match token_override {
            Some(token) => token.to_string(),
            None => self
                .store
                .access_token()?
                .ok_or(SessionError::NoAccessToken)?,
        };

        let profile = self.transport.fetch_profile(&token).await?;
        if profile.is_null() {
            return Err(SessionError::EmptyProfile);
        }

        self.store.set_user_profile(&profile)?;
        *self.user.lock().unwrap() = Some(profile.clone());
        let _ = self.transition(&SessionInput::ProfileLoaded);

        debug!("User profile fetched and persisted");
        Ok(profile)
    }

    /// Tear the session down: external sign-out, clear all three persisted
    /// keys together, reset the in-memory user, redirect to login.
    ///
    /// A failing external sign-out is reported but never blocks the local
    /// teardown.
    pub async fn logout(&self) {
        if let Err(message) = self.sign_out.sign_out().await {
            warn!(%message, "External sign-out failed");
            self.notifier.publish(Notice::warning(format!(
                "Sign-out reported an error: {message}"
            )));
        }

        self.cancel_refresh();

        if let Err(error) = self.store.clear_session() {
            self.report(&SessionError::Store(error));
        }
        self.clear_user();
        let _ = self.transition(&SessionInput::SessionCleared);

        self.navigator.redirect_to_login();
        info!("Logged out");
    }

    /// Re-read the profile another instance wrote to the store.
    ///
    /// A parse failure is reported but leaves the session intact.
    pub fn adopt_stored_profile(&self) {
        match self.store.user_profile() {
            Ok(Some(profile)) => {
                self.install_profile(profile);
                debug!("Adopted profile written by another session instance");
            }
            Ok(None) => {}
            Err(error) => {
                self.report(&SessionError::ProfileParse(error.to_string()));
            }
        }
    }

    /// Arm the proactive refresh timer for the given token.
    ///
    /// Replaces (and thereby cancels) any previously armed timer.
    fn arm_refresh(&self, token: &str) {
        let weak = self.weak_self.clone();
        let handle = schedule_refresh(
            move || {
                if let Some(service) = weak.upgrade() {
                    tokio::spawn(async move {
                        let _ = service.refresh_session().await;
                    });
                }
            },
            token,
            DEFAULT_REFRESH_THRESHOLD,
        );
        *self.refresh_timer.lock().unwrap() = Some(handle);
    }

    fn arm_refresh_from_store(&self) {
        if let Ok(Some(token)) = self.store.access_token() {
            self.arm_refresh(&token);
        }
    }

    fn cancel_refresh(&self) {
        // Dropping the handle disarms the timer.
        self.refresh_timer.lock().unwrap().take();
    }

    /// Release the service's timers.
    ///
    /// Hosts that drive `reconcile` manually call this on teardown; `run`
    /// does it when its loop exits.
    pub fn dispose(&self) {
        self.cancel_refresh();
    }
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("state", &self.state())
            .field("bootstrapped", &self.is_bootstrapped())
            .finish_non_exhaustive()
    }
}

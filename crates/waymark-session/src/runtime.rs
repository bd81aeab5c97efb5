//! Convenience wiring from configuration to a full session stack.
//!
//! Hosts that do not need custom assembly build everything here: the
//! file-backed store under the app's base directory, the HTTP clients bound
//! to the configured base URL, the bus, and the session service.

use crate::bus::SessionBus;
use crate::collaborators::{ExternalSignOut, Navigator, NotificationSink};
use crate::error::SessionError;
use crate::login::login_with_credentials;
use crate::service::SessionService;
use crate::transport::HttpAuthGateway;
use serde_json::Value;
use std::sync::Arc;
use waymark_api::{ApiClient, AuthApiClient};
use waymark_core::{Config, Paths};
use waymark_storage::{FileStore, SessionStore};

/// Fully wired session stack.
pub struct SessionRuntime {
    api: AuthApiClient,
    store: SessionStore,
    bus: SessionBus,
    service: Arc<SessionService>,
}

impl SessionRuntime {
    /// Wire the stack from configuration.
    ///
    /// The persistent store lives at `Paths::session_file`; both clients
    /// resolve against `Config::api_base_url`.
    pub fn build(
        config: &Config,
        paths: &Paths,
        sign_out: Arc<dyn ExternalSignOut>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self, SessionError> {
        let base_url = config.api_base_url()?;
        let backend = FileStore::open(paths.session_file())?;
        let store = SessionStore::new(Arc::new(backend));

        let client = ApiClient::new(base_url);
        let api = AuthApiClient::new(client.clone(), store.clone());
        let bus = SessionBus::new();
        let gateway = HttpAuthGateway::new(client);

        let service = SessionService::new(
            store.clone(),
            Arc::new(gateway),
            sign_out,
            navigator,
            notifier,
            bus.clone(),
        );

        Ok(Self {
            api,
            store,
            bus,
            service,
        })
    }

    /// Authenticated client for application data calls.
    pub fn api(&self) -> &AuthApiClient {
        &self.api
    }

    /// The persistent session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The cross-instance event bus.
    pub fn bus(&self) -> &SessionBus {
        &self.bus
    }

    /// The session service.
    pub fn service(&self) -> &Arc<SessionService> {
        &self.service
    }

    /// Log in with email and password through the runtime's own client,
    /// store, and bus.
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, SessionError> {
        login_with_credentials(self.api.plain(), &self.store, &self.bus, email, password).await
    }
}

impl std::fmt::Debug for SessionRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRuntime")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::Notice;
    use crate::state::SessionState;
    use async_trait::async_trait;

    struct NoopSignOut;

    #[async_trait]
    impl ExternalSignOut for NoopSignOut {
        async fn sign_out(&self) -> Result<(), String> {
            Ok(())
        }
    }

    struct NoopNavigator;

    impl Navigator for NoopNavigator {
        fn redirect_to_login(&self) {}
    }

    struct NoopNotifier;

    impl NotificationSink for NoopNotifier {
        fn publish(&self, _notice: Notice) {}
    }

    fn build_runtime(dir: &std::path::Path) -> SessionRuntime {
        let config = Config::default();
        let paths = Paths::with_base_dir(dir.to_path_buf());
        SessionRuntime::build(
            &config,
            &paths,
            Arc::new(NoopSignOut),
            Arc::new(NoopNavigator),
            Arc::new(NoopNotifier),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_wires_a_fresh_stack() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = build_runtime(dir.path());

        assert_eq!(runtime.service().state(), SessionState::Unknown);
        assert!(!runtime.store().has_session().unwrap());
    }

    #[tokio::test]
    async fn test_store_is_shared_between_clients_and_service() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = build_runtime(dir.path());

        runtime.store().set_access_token("token-1").unwrap();

        // The same backing file is visible through every handle.
        assert_eq!(
            runtime.store().access_token().unwrap(),
            Some("token-1".to_string())
        );
        assert!(dir.path().join("session.json").exists());
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.api_base_url = "not a url".to_string();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let result = SessionRuntime::build(
            &config,
            &paths,
            Arc::new(NoopSignOut),
            Arc::new(NoopNavigator),
            Arc::new(NoopNotifier),
        );
        assert!(result.is_err());
    }
}

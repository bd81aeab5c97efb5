//! High-level API for the three session slots.

use crate::{KeyValueStore, MemoryStore, StorageKeys, StoreError, StoreResult};
use serde_json::Value;
use std::sync::Arc;

/// Facade over the persistent store for exactly three slots: access token,
/// refresh token, and the serialized user profile.
///
/// This is the single place that knows the slot names and the single
/// implementation of "clear all three together". Callers never address the
/// backend directly.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Create a session store over the given backend.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Create a session store over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Retrieve the access token.
    pub fn access_token(&self) -> StoreResult<Option<String>> {
        self.backend.get(StorageKeys::ACCESS_TOKEN)
    }

    /// Store the access token.
    pub fn set_access_token(&self, token: &str) -> StoreResult<()> {
        self.backend.set(StorageKeys::ACCESS_TOKEN, token)
    }

    /// Retrieve the refresh token.
    pub fn refresh_token(&self) -> StoreResult<Option<String>> {
        self.backend.get(StorageKeys::REFRESH_TOKEN)
    }

    /// Store the refresh token.
    pub fn set_refresh_token(&self, token: &str) -> StoreResult<()> {
        self.backend.set(StorageKeys::REFRESH_TOKEN, token)
    }

    /// Retrieve the serialized user profile without parsing it.
    pub fn user_profile_raw(&self) -> StoreResult<Option<String>> {
        self.backend.get(StorageKeys::USER_PROFILE)
    }

    /// Retrieve and parse the stored user profile.
    ///
    /// A present-but-unparseable profile is an `Encoding` error; callers
    /// decide whether that is recoverable.
    pub fn user_profile(&self) -> StoreResult<Option<Value>> {
        match self.backend.get(StorageKeys::USER_PROFILE)? {
            Some(raw) => {
                let profile: Value = serde_json::from_str(&raw)
                    .map_err(|e| StoreError::Encoding(e.to_string()))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// Serialize and store the user profile.
    pub fn set_user_profile(&self, profile: &Value) -> StoreResult<()> {
        let raw =
            serde_json::to_string(profile).map_err(|e| StoreError::Encoding(e.to_string()))?;
        self.backend.set(StorageKeys::USER_PROFILE, &raw)
    }

    /// Store a complete session triple.
    pub fn set_session(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        profile: Option<&Value>,
    ) -> StoreResult<()> {
        self.set_access_token(access_token)?;
        if let Some(refresh) = refresh_token {
            self.set_refresh_token(refresh)?;
        }
        if let Some(profile) = profile {
            self.set_user_profile(profile)?;
        }
        Ok(())
    }

    /// Check whether an access token is present.
    pub fn has_session(&self) -> StoreResult<bool> {
        self.backend.has(StorageKeys::ACCESS_TOKEN)
    }

    /// Clear all three slots together.
    ///
    /// Deletions run in a fixed order; a partially cleared session is
    /// tolerable since any missing key makes the rest non-functional.
    pub fn clear_session(&self) -> StoreResult<()> {
        let _ = self.backend.delete(StorageKeys::ACCESS_TOKEN);
        let _ = self.backend.delete(StorageKeys::REFRESH_TOKEN);
        let _ = self.backend.delete(StorageKeys::USER_PROFILE);
        tracing::debug!("Session store cleared");
        Ok(())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_store_tokens() {
        let store = SessionStore::in_memory();

        assert!(!store.has_session().unwrap());
        assert_eq!(store.access_token().unwrap(), None);

        store.set_access_token("access-1").unwrap();
        store.set_refresh_token("refresh-1").unwrap();

        assert!(store.has_session().unwrap());
        assert_eq!(store.access_token().unwrap(), Some("access-1".to_string()));
        assert_eq!(
            store.refresh_token().unwrap(),
            Some("refresh-1".to_string())
        );
    }

    #[test]
    fn test_session_store_profile_roundtrip() {
        let store = SessionStore::in_memory();

        let profile = json!({"id": 7, "email": "test@example.com"});
        store.set_user_profile(&profile).unwrap();

        assert_eq!(store.user_profile().unwrap(), Some(profile));
    }

    #[test]
    fn test_corrupt_profile_is_encoding_error() {
        // Write invalid JSON directly through the backend.
        let backend = Arc::new(MemoryStore::new());
        backend.set(StorageKeys::USER_PROFILE, "{not json").unwrap();
        let store = SessionStore::new(backend);

        let result = store.user_profile();
        assert!(matches!(result, Err(StoreError::Encoding(_))));
        // The raw accessor still hands back the stored bytes.
        assert_eq!(
            store.user_profile_raw().unwrap(),
            Some("{not json".to_string())
        );
    }

    #[test]
    fn test_set_session_writes_triple() {
        let store = SessionStore::in_memory();
        let profile = json!({"id": 1});

        store
            .set_session("access", Some("refresh"), Some(&profile))
            .unwrap();

        assert_eq!(store.access_token().unwrap(), Some("access".to_string()));
        assert_eq!(store.refresh_token().unwrap(), Some("refresh".to_string()));
        assert_eq!(store.user_profile().unwrap(), Some(profile));
    }

    #[test]
    fn test_set_session_without_refresh_token() {
        // External-session-issued tokens may omit the refresh token.
        let store = SessionStore::in_memory();
        store.set_session("access", None, None).unwrap();

        assert_eq!(store.access_token().unwrap(), Some("access".to_string()));
        assert_eq!(store.refresh_token().unwrap(), None);
    }

    #[test]
    fn test_clear_session_removes_all_three() {
        let store = SessionStore::in_memory();
        store
            .set_session("access", Some("refresh"), Some(&json!({"id": 1})))
            .unwrap();

        store.clear_session().unwrap();

        assert_eq!(store.access_token().unwrap(), None);
        assert_eq!(store.refresh_token().unwrap(), None);
        assert_eq!(store.user_profile_raw().unwrap(), None);
        assert!(!store.has_session().unwrap());
    }

    #[test]
    fn test_clear_session_on_empty_store_is_ok() {
        let store = SessionStore::in_memory();
        store.clear_session().unwrap();
        assert!(!store.has_session().unwrap());
    }
}

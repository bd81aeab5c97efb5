//! Credential login.
//!
//! Login lives outside the reconciler: it writes the session triple to the
//! persistent store directly, then broadcasts `ProfileChanged` so every
//! running session service adopts the new profile.

use crate::bus::SessionBus;
use crate::error::SessionError;
use serde_json::{json, Value};
use waymark_api::ApiClient;
use waymark_storage::SessionStore;

/// Credential login endpoint.
pub const LOGIN_PATH: &str = "auth/login/";

/// Log in with email and password.
///
/// Expects `{access, refresh, user}` from the server; persists the triple
/// and announces the profile change. Credential issuance itself is entirely
/// server-side.
pub async fn login_with_credentials(
    api: &ApiClient,
    store: &SessionStore,
    bus: &SessionBus,
    email: &str,
    password: &str,
) -> Result<Value, SessionError> {
    let body = json!({ "email": email, "password": password });

    let response = api
        .post(LOGIN_PATH, &body)
        .await
        .map_err(|error| SessionError::Login(error.to_string()))?;

    let access_token = response
        .get("access")
        .and_then(Value::as_str)
        .ok_or_else(|| SessionError::Login("Login response missing access token".to_string()))?;
    let refresh_token = response.get("refresh").and_then(Value::as_str);
    let profile = response
        .get("user")
        .cloned()
        .filter(|value| !value.is_null());

    store.set_session(access_token, refresh_token, profile.as_ref())?;
    bus.profile_changed();

    tracing::info!(email = %email, "Credential login complete");
    Ok(response)
}

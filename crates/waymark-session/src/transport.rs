//! Auth transport: refresh exchange and profile fetch.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use waymark_api::{ApiClient, ApiError, Method, DEFAULT_TIMEOUT_MS};

/// Refresh-token exchange endpoint.
pub const REFRESH_PATH: &str = "auth/token/refresh/";
/// Signed-in user profile endpoint.
pub const PROFILE_PATH: &str = "auth/user/";

/// Result of one refresh-token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    /// Present when the server rotates refresh tokens.
    pub refresh_token: Option<String>,
}

/// Network seam of the session service.
///
/// The reconciliation scenarios are tested against a fake implementation;
/// `HttpAuthGateway` is the production one.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Exchange a refresh token for a new access token, exactly once.
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenPair, ApiError>;

    /// Fetch the signed-in user's profile with an explicit bearer token.
    async fn fetch_profile(&self, access_token: &str) -> Result<Value, ApiError>;
}

/// Production transport over the Waymark backend.
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    api: ApiClient,
}

impl HttpAuthGateway {
    /// Create a gateway over the given client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthTransport for HttpAuthGateway {
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let body = json!({ "refresh": refresh_token });
        let response = self.api.post(REFRESH_PATH, &body).await?;

        let access_token = response
            .get("access")
            .and_then(Value::as_str)
            .ok_or(ApiError::Unexpected)?
            .to_string();
        let refresh_token = response
            .get("refresh")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Value, ApiError> {
        self.api
            .request_with_bearer(
                Method::GET,
                PROFILE_PATH,
                None,
                Duration::from_millis(DEFAULT_TIMEOUT_MS),
                Some(access_token),
            )
            .await
    }
}

//! Credential-injecting client variant.

use crate::client::{ApiClient, DEFAULT_TIMEOUT_MS};
use crate::error::ApiResult;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use waymark_storage::SessionStore;

/// `ApiClient` variant that reads the current access token from the
/// persistent store on every call and injects `Authorization: Bearer`.
///
/// It deliberately does not test expiry or trigger refreshes; the session
/// service guarantees a fresh token is persisted before authenticated calls
/// that matter for correctness.
#[derive(Debug, Clone)]
pub struct AuthApiClient {
    inner: ApiClient,
    store: SessionStore,
}

impl AuthApiClient {
    /// Create an authenticated client over a base client and a store.
    pub fn new(inner: ApiClient, store: SessionStore) -> Self {
        Self { inner, store }
    }

    /// The underlying, credential-free client.
    pub fn plain(&self) -> &ApiClient {
        &self.inner
    }

    /// Issue a request with the stored credential and an explicit timeout.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        timeout: Duration,
    ) -> ApiResult<Value> {
        let token = self.store.access_token()?;
        self.inner
            .request_with_bearer(method, path, body, timeout, token.as_deref())
            .await
    }

    /// GET at the default timeout.
    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.request(
            Method::GET,
            path,
            None,
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
        )
        .await
    }

    /// POST a JSON payload at the default timeout.
    pub async fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.request(
            Method::POST,
            path,
            Some(body),
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
        )
        .await
    }

    /// PUT a JSON payload at the default timeout.
    pub async fn put(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.request(
            Method::PUT,
            path,
            Some(body),
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
        )
        .await
    }

    /// PATCH a JSON payload at the default timeout.
    pub async fn patch(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.request(
            Method::PATCH,
            path,
            Some(body),
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
        )
        .await
    }

    /// DELETE at the default timeout.
    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.request(
            Method::DELETE,
            path,
            None,
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
        )
        .await
    }
}

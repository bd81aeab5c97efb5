//! JSON HTTP client with per-call timeout and uniform error handling.

use crate::error::{ApiError, ApiResult};
use crate::normalize::normalize_error_body;
use reqwest::{header, Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

/// Default per-call timeout budget.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// JSON-in/JSON-out HTTP client bound to a base URL.
///
/// Every call owns its own timeout; the response is either the parsed body
/// (`{"success": true}` for 204) or an `ApiError` whose message is the one
/// string the UI shows.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the given base URL.
    pub fn new(mut base_url: Url) -> Self {
        // A trailing slash makes Url::join treat the base as a directory, so
        // relative paths append instead of replacing the last segment.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Issue a request with an explicit timeout and no credential.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        timeout: Duration,
    ) -> ApiResult<Value> {
        self.request_with_bearer(method, path, body, timeout, None)
            .await
    }

    /// Issue a request, optionally injecting a bearer credential.
    pub async fn request_with_bearer(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        timeout: Duration,
        bearer: Option<&str>,
    ) -> ApiResult<Value> {
        let url = self.endpoint(path)?;
        let timeout_ms = timeout.as_millis() as u64;

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .timeout(timeout)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, %url, timeout_ms, "Sending request");

        let response = request
            .send()
            .await
            .map_err(|error| classify_transport_error(error, timeout_ms))?;

        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(json!({"success": true}));
        }

        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|error| classify_transport_error(error, timeout_ms));
        }

        // Non-2xx: best-effort parse, then reduce to one message.
        let text = response.text().await.unwrap_or_default();
        let body: Option<Value> = serde_json::from_str(&text).ok();
        let message = body
            .as_ref()
            .map_or_else(
                || crate::error::UNEXPECTED_ERROR.to_string(),
                normalize_error_body,
            );

        tracing::warn!(status = status.as_u16(), %message, "Request failed");

        Err(ApiError::Validation {
            message,
            status: status.as_u16(),
            body,
        })
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

/// Map a reqwest failure to the error vocabulary.
fn classify_transport_error(error: reqwest::Error, timeout_ms: u64) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout {
            timeout_ms,
            source: error,
        }
    } else {
        ApiError::Network {
            message: error.to_string(),
            source: error,
        }
    }
}

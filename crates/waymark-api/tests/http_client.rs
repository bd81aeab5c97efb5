//! End-to-end tests for the HTTP client against a local axum fixture.

use axum::extract::Json as ExtractJson;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;
use waymark_api::{ApiClient, ApiError, AuthApiClient, Method, DEFAULT_TIMEOUT_MS};
use waymark_storage::SessionStore;

async fn spawn_fixture() -> Url {
    let app = Router::new()
        .route("/profile", get(|| async { Json(json!({"id": 7, "name": "Ada"})) }))
        .route(
            "/echo",
            post(|ExtractJson(body): ExtractJson<Value>| async move { Json(body) }),
        )
        .route("/empty", delete(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/invalid",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"email": ["Invalid", "Too long"]})),
                )
            }),
        )
        .route(
            "/denied",
            get(|| async {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({"detail": "You do not have permission to perform this action."})),
                )
            }),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::BAD_GATEWAY, "<html>upstream died</html>") }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Json(json!({"too": "late"}))
            }),
        )
        .route(
            "/whoami",
            get(|headers: HeaderMap| async move {
                let authorization = headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                Json(json!({"authorization": authorization}))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Url::parse(&format!("http://{addr}")).unwrap()
}

#[tokio::test]
async fn success_body_is_returned_verbatim() {
    let client = ApiClient::new(spawn_fixture().await);

    let body = client.get("profile").await.unwrap();
    assert_eq!(body, json!({"id": 7, "name": "Ada"}));
}

#[tokio::test]
async fn post_serializes_payload() {
    let client = ApiClient::new(spawn_fixture().await);

    let payload = json!({"origin": "home", "destination": "work"});
    let body = client.post("echo", &payload).await.unwrap();
    assert_eq!(body, payload);
}

#[tokio::test]
async fn no_content_becomes_synthetic_success() {
    let client = ApiClient::new(spawn_fixture().await);

    let body = client.delete("empty").await.unwrap();
    assert_eq!(body, json!({"success": true}));
}

#[tokio::test]
async fn field_errors_are_normalized() {
    // Scenario F: a 500 with per-field messages reduces to one line.
    let client = ApiClient::new(spawn_fixture().await);

    let error = client.get("invalid").await.unwrap_err();
    assert_eq!(error.to_string(), "Email: Invalid, Too long");
    match error {
        ApiError::Validation { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, Some(json!({"email": ["Invalid", "Too long"]})));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn detail_errors_are_passed_through() {
    let client = ApiClient::new(spawn_fixture().await);

    let error = client.get("denied").await.unwrap_err();
    assert_eq!(
        error.to_string(),
        "You do not have permission to perform this action."
    );
    assert_eq!(error.status(), Some(403));
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_generic() {
    let client = ApiClient::new(spawn_fixture().await);

    let error = client.get("broken").await.unwrap_err();
    assert_eq!(error.to_string(), "An unexpected error occurred");
    match error {
        ApiError::Validation { status, body, .. } => {
            assert_eq!(status, 502);
            assert_eq!(body, None);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn timeout_produces_budget_message() {
    let client = ApiClient::new(spawn_fixture().await);

    let error = client
        .request(Method::GET, "slow", None, Duration::from_millis(200))
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "Request timed out after 200ms");
    assert!(matches!(error, ApiError::Timeout { timeout_ms: 200, .. }));
}

#[tokio::test]
async fn connection_refused_is_a_network_error() {
    // Reserve a port, then close it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(Url::parse(&format!("http://{addr}")).unwrap());
    let error = client.get("profile").await.unwrap_err();

    assert!(matches!(error, ApiError::Network { .. }));
    assert!(!error.to_string().is_empty());
}

#[tokio::test]
async fn authed_client_injects_stored_bearer() {
    let base = spawn_fixture().await;
    let store = SessionStore::in_memory();
    store.set_access_token("token-123").unwrap();

    let client = AuthApiClient::new(ApiClient::new(base), store);
    let body = client.get("whoami").await.unwrap();

    assert_eq!(body, json!({"authorization": "Bearer token-123"}));
}

#[tokio::test]
async fn authed_client_without_token_sends_no_header() {
    let base = spawn_fixture().await;
    let store = SessionStore::in_memory();

    let client = AuthApiClient::new(ApiClient::new(base), store);
    let body = client.get("whoami").await.unwrap();

    assert_eq!(body, json!({"authorization": null}));
}

#[tokio::test]
async fn default_timeout_is_five_seconds() {
    assert_eq!(DEFAULT_TIMEOUT_MS, 5_000);
}

//! HTTP client for the Waymark backend.
//!
//! This crate provides:
//! - `ApiClient`, a thin JSON-in/JSON-out wrapper over reqwest with a
//!   per-call timeout and a uniform error vocabulary
//! - `AuthApiClient`, the same surface with the persisted bearer credential
//!   injected on every call
//! - The server validation-error normalizer that reduces arbitrary error
//!   bodies to one human-readable string

mod authed;
mod client;
mod error;
mod normalize;

pub use authed::AuthApiClient;
pub use client::{ApiClient, DEFAULT_TIMEOUT_MS};
pub use error::{ApiError, ApiResult, UNEXPECTED_ERROR};
pub use normalize::normalize_error_body;

pub use reqwest::Method;

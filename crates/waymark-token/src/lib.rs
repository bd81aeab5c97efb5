//! Bearer-token inspection and refresh scheduling.
//!
//! Pure functions over an opaque bearer credential: payload decoding, expiry
//! testing, time-remaining, and a one-shot refresh-scheduling primitive that
//! returns a cancellation handle. No network access; the session service
//! owns all refresh traffic.

mod claims;
mod clock;
mod schedule;

pub use claims::{decode, Claims};
pub use clock::{is_expired, time_remaining, DEFAULT_EXPIRY_BUFFER_SECS};
pub use schedule::{schedule_refresh, RefreshHandle, DEFAULT_REFRESH_THRESHOLD};

use thiserror::Error;

/// Token inspection error type.
///
/// Every decoding failure surfaces as one of these variants; token handling
/// never leaks another error type to callers.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Token does not have the expected three-segment shape
    #[error("Malformed token")]
    Malformed,

    /// Payload segment is not valid base64url
    #[error("Invalid token encoding: {0}")]
    Encoding(String),

    /// Payload is not the expected JSON document
    #[error("Invalid token payload: {0}")]
    Payload(String),
}

/// Result type alias using TokenError.
pub type TokenResult<T> = Result<T, TokenError>;

#[cfg(test)]
pub(crate) mod testutil {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    /// Build an unsigned, JWT-shaped token with the given payload.
    pub(crate) fn make_token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("{header}.{body}.signature")
    }
}

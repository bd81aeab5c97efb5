//! Expiry testing against the wall clock.

use crate::claims::decode;
use chrono::Utc;
use std::time::Duration;

/// Default safety buffer applied when testing expiry.
///
/// A token within this many seconds of its expiry instant is already treated
/// as expired, so an in-flight request cannot outlive its credential.
pub const DEFAULT_EXPIRY_BUFFER_SECS: u64 = 60;

/// Check whether a token is expired, with a safety buffer.
///
/// A token that cannot be decoded counts as expired (fail closed).
pub fn is_expired(token: &str, buffer_secs: u64) -> bool {
    match decode(token) {
        Ok(claims) => claims.exp < Utc::now().timestamp() + buffer_secs as i64,
        Err(error) => {
            tracing::debug!(%error, "Treating undecodable token as expired");
            true
        }
    }
}

/// Seconds until the token's expiry instant, saturating at zero.
///
/// An undecodable token has no time remaining.
pub fn time_remaining(token: &str) -> Duration {
    match decode(token) {
        Ok(claims) => {
            let remaining = claims.exp - Utc::now().timestamp();
            Duration::from_secs(remaining.max(0) as u64)
        }
        Err(_) => Duration::ZERO,
    }
}

//! One-shot refresh scheduling.

use crate::claims::decode;
use chrono::Utc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default lead time before expiry at which a refresh fires.
pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::from_secs(300);

/// Cancellation handle for a scheduled refresh.
///
/// Must be cancelled (or dropped) on logout or teardown so the timer cannot
/// fire after the session has ended. An inert handle is returned when the
/// callback already ran.
#[derive(Debug)]
pub struct RefreshHandle {
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    fn inert() -> Self {
        Self { task: None }
    }

    /// Whether a timer is still armed.
    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Disarm the timer. Calling this after the callback fired is a no-op.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Arm a one-shot timer that invokes `callback` `threshold` before the
/// token's expiry instant.
///
/// If that instant is already due — or the token cannot be decoded — the
/// callback is invoked immediately, on the current tick, and an inert handle
/// is returned. The timer never reschedules itself; the caller re-arms after
/// each successful refresh.
pub fn schedule_refresh<F>(callback: F, token: &str, threshold: Duration) -> RefreshHandle
where
    F: FnOnce() + Send + 'static,
{
    let now_ms = Utc::now().timestamp_millis();
    let refresh_at_ms = match decode(token) {
        Ok(claims) => claims.exp * 1_000 - threshold.as_millis() as i64,
        // Fail closed: an undecodable token is due for refresh right now.
        Err(_) => now_ms,
    };

    if refresh_at_ms <= now_ms {
        tracing::debug!("Refresh already due, invoking callback immediately");
        callback();
        return RefreshHandle::inert();
    }

    let delay = Duration::from_millis((refresh_at_ms - now_ms) as u64);
    tracing::debug!(delay_ms = delay.as_millis() as u64, "Refresh timer armed");

    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        callback();
    });

    RefreshHandle { task: Some(task) }
}

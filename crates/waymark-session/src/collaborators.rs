//! Collaborator seams consumed by the session service.
//!
//! Each external dependency (the third-party session provider, sign-out,
//! navigation, notification display) is an injected interface so the
//! reconciler can be exercised with fakes.

use crate::error::ErrorCategory;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

/// Status reported by the external session provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    /// The provider has not resolved yet; reconciliation is a no-op.
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Tokens carried by an external session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTokens {
    pub access_token: String,
    /// May be absent; the reconciler adopts it when present.
    pub refresh_token: Option<String>,
}

/// One observation of the external session provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSnapshot {
    pub status: ProviderStatus,
    pub tokens: Option<ProviderTokens>,
    pub profile: Option<Value>,
}

impl ProviderSnapshot {
    /// Provider has not resolved yet.
    pub fn loading() -> Self {
        Self {
            status: ProviderStatus::Loading,
            tokens: None,
            profile: None,
        }
    }

    /// Provider resolved with no session.
    pub fn unauthenticated() -> Self {
        Self {
            status: ProviderStatus::Unauthenticated,
            tokens: None,
            profile: None,
        }
    }

    /// Provider resolved with a session, optionally carrying tokens and a
    /// profile of its own.
    pub fn authenticated(tokens: Option<ProviderTokens>, profile: Option<Value>) -> Self {
        Self {
            status: ProviderStatus::Authenticated,
            tokens,
            profile,
        }
    }
}

/// External session provider.
///
/// The receiver always holds the provider's current snapshot; every change
/// triggers a reconciliation pass in `SessionService::run`.
pub trait SessionProvider: Send + Sync {
    fn observe(&self) -> watch::Receiver<ProviderSnapshot>;
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Success,
    Warning,
}

/// One notification handed to the display sink.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub details: Option<String>,
    pub category: Option<ErrorCategory>,
}

impl Notice {
    /// An error notice with a category tag.
    pub fn error(message: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            details: None,
            category: Some(category),
        }
    }

    /// A success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            details: None,
            category: None,
        }
    }

    /// A warning notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
            details: None,
            category: None,
        }
    }

    /// Attach detail text for expanded display.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Notification display sink. Display behavior (icons, auto-dismiss) is the
/// sink's concern, not the session layer's.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notice: Notice);
}

/// External sign-out collaborator (e.g. the identity provider's own
/// sign-out endpoint).
#[async_trait]
pub trait ExternalSignOut: Send + Sync {
    async fn sign_out(&self) -> Result<(), String>;
}

/// Navigation primitive targeting the login route.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

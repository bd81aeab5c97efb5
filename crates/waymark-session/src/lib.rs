//! Session reconciliation for the Waymark client.
//!
//! This crate provides:
//! - `SessionService`, the state machine that converges persisted tokens,
//!   the in-memory user, and an external session provider to one consistent
//!   session state
//! - `SessionBus`, the process-wide broadcast channel that lets a
//!   credential-login flow announce "the persisted profile changed"
//! - The collaborator seams (provider, sign-out, navigation, notifications)
//!   so the reconciler can be driven and tested without a UI
//! - `HttpAuthGateway`, the production transport for refresh-token exchange
//!   and profile fetches
//! - `SessionRuntime`, convenience wiring from configuration to a full
//!   stack for hosts that do not need custom assembly

mod bus;
mod collaborators;
mod error;
mod login;
mod runtime;
mod service;
mod state;
mod transport;

pub use bus::{SessionBus, SessionEvent};
pub use collaborators::{
    ExternalSignOut, Navigator, Notice, NoticeKind, NotificationSink, ProviderSnapshot,
    ProviderStatus, ProviderTokens, SessionProvider,
};
pub use error::{ErrorCategory, SessionError};
pub use login::{login_with_credentials, LOGIN_PATH};
pub use runtime::SessionRuntime;
pub use service::{SessionService, StateCallback};
pub use state::session_lifecycle;
pub use state::{SessionInput, SessionMachine, SessionMachineState, SessionState};
pub use transport::{AuthTransport, HttpAuthGateway, TokenPair, PROFILE_PATH, REFRESH_PATH};

//! Session state machine using rust-fsm.
//!
//! The lifecycle is deliberately small:
//!
//! ```text
//! ┌─────────────┐ BootstrapStarted ┌─────────────┐
//! │   Unknown   │ ───────────────► │   Loading   │
//! └─────────────┘                  └──────┬──────┘
//!                          ProfileLoaded  │  SessionCleared
//!                        ┌────────────────┴────────────────┐
//!                        ▼                                 ▼
//!               ┌────────────────┐  SessionCleared ┌────────────────┐
//!               │ Authenticated  │ ──────────────► │Unauthenticated │
//!               └────────────────┘ ◄────────────── └────────────────┘
//!                                   ProfileLoaded
//! ```
//!
//! `Loading` exists only during bootstrap; once the first effective
//! reconciliation pass completes, the machine only moves between the two
//! settled states.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

// Define the FSM using rust-fsm's declarative macro.
// This generates a module `session_lifecycle` with:
// - session_lifecycle::State (enum)
// - session_lifecycle::Input (enum)
// - session_lifecycle::StateMachine (type alias)
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_lifecycle(Unknown)

    Unknown => {
        BootstrapStarted => Loading,
        // A cross-instance login can land before the first reconcile.
        ProfileLoaded => Authenticated,
        SessionCleared => Unauthenticated
    },
    Loading => {
        ProfileLoaded => Authenticated,
        SessionCleared => Unauthenticated
    },
    Authenticated => {
        ProfileLoaded => Authenticated,
        SessionCleared => Unauthenticated
    },
    Unauthenticated => {
        ProfileLoaded => Authenticated,
        SessionCleared => Unauthenticated
    }
}

// Re-export the generated types with clearer names
pub use session_lifecycle::Input as SessionInput;
pub use session_lifecycle::State as SessionMachineState;
pub use session_lifecycle::StateMachine as SessionMachine;

/// User-facing session state.
///
/// A simplified view of the machine state for UI shells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Bootstrap has not run yet.
    Unknown,
    /// The first reconciliation pass is in flight.
    Loading,
    /// A user profile is present.
    Authenticated,
    /// No session; an explicit empty state, not an error.
    Unauthenticated,
}

impl SessionState {
    /// Returns true when a signed-in user is present.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }

    /// Returns true once bootstrap has resolved either way.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticated | SessionState::Unauthenticated
        )
    }
}

impl From<&SessionMachineState> for SessionState {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::Unknown => SessionState::Unknown,
            SessionMachineState::Loading => SessionState::Loading,
            SessionMachineState::Authenticated => SessionState::Authenticated,
            SessionMachineState::Unauthenticated => SessionState::Unauthenticated,
        }
    }
}

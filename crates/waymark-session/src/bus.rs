//! Cross-instance session synchronization.
//!
//! A credential-login flow writes the session triple to the persistent
//! store, then announces the change here. Every running session service
//! re-reads the stored profile without a full reconciliation pass.

use tokio::sync::broadcast;

const BUS_CAPACITY: usize = 16;

/// Events broadcast between session instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The persisted profile changed; re-read it.
    ProfileChanged,
}

/// Process-wide broadcast channel for session events.
///
/// Cheap to clone; all clones share one channel.
#[derive(Debug, Clone)]
pub struct SessionBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionBus {
    /// Create a new bus.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Announce that the persisted profile changed.
    ///
    /// Lossy by design: with no subscribers the event simply disappears.
    pub fn profile_changed(&self) {
        let _ = self.tx.send(SessionEvent::ProfileChanged);
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new()
    }
}

//! Server lifecycle state.
//!
//! ```text
//! Starting ──bind ok──▶ Listening ──shutdown──▶ Draining ──▶ Stopped
//!    ▲                      │
//!    └──── serve error ─────┘ (retry)
//! ```

use std::net::SocketAddr;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Binding the listener (also re-entered between retries).
    Starting,
    /// Accepting connections on `addr`.
    Listening { addr: SocketAddr },
    /// Shutdown requested; waiting for in-flight requests.
    Draining,
    /// No longer serving.
    Stopped,
}

impl LifecycleState {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self {
            LifecycleState::Listening { addr } => Some(*addr),
            _ => None,
        }
    }
}

/// Publishes lifecycle transitions to any number of observers.
#[derive(Debug)]
pub struct StateTracker {
    tx: watch::Sender<LifecycleState>,
}

impl StateTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Starting);
        Self { tx }
    }

    pub fn set(&self, state: LifecycleState) {
        let previous = self.tx.send_replace(state);
        if previous != state {
            tracing::debug!(from = ?previous, to = ?state, "Lifecycle transition");
        }
    }

    pub fn current(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observers_see_latest_state() {
        let tracker = StateTracker::new();
        let rx = tracker.subscribe();
        assert_eq!(*rx.borrow(), LifecycleState::Starting);

        let addr: SocketAddr = "127.0.0.1:8550".parse().unwrap();
        tracker.set(LifecycleState::Listening { addr });
        assert_eq!(rx.borrow().local_addr(), Some(addr));

        tracker.set(LifecycleState::Stopped);
        assert_eq!(tracker.current(), LifecycleState::Stopped);
        assert_eq!(rx.borrow().local_addr(), None);
    }
}

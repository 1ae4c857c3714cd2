//! Observable server lifecycle state.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Listening,
    ShuttingDown,
    Terminated,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Starting => "starting",
            Self::Listening => "listening",
            Self::ShuttingDown => "shutting_down",
            Self::Terminated => "terminated",
        })
    }
}

/// Current lifecycle state, published over a watch channel.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    tx: Arc<watch::Sender<LifecycleState>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Starting);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }

    /// Move to `next`. States only advance; a backwards move is ignored.
    pub fn advance(&self, next: LifecycleState) {
        let moved = self.tx.send_if_modified(|state| {
            if rank(next) > rank(*state) {
                *state = next;
                true
            } else {
                false
            }
        });
        if moved {
            tracing::debug!(state = %next, "Lifecycle state changed");
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

fn rank(state: LifecycleState) -> u8 {
    match state {
        LifecycleState::Starting => 0,
        LifecycleState::Listening => 1,
        LifecycleState::ShuttingDown => 2,
        LifecycleState::Terminated => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_in_order() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.current(), LifecycleState::Starting);

        lifecycle.advance(LifecycleState::Listening);
        lifecycle.advance(LifecycleState::ShuttingDown);
        assert_eq!(lifecycle.current(), LifecycleState::ShuttingDown);
    }

    #[test]
    fn never_moves_backwards() {
        let lifecycle = Lifecycle::new();
        lifecycle.advance(LifecycleState::Terminated);
        lifecycle.advance(LifecycleState::Listening);
        assert_eq!(lifecycle.current(), LifecycleState::Terminated);
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let lifecycle = Lifecycle::new();
        let mut rx = lifecycle.subscribe();

        lifecycle.advance(LifecycleState::Listening);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), LifecycleState::Listening);
    }
}

//! The bot's lifecycle state machine.
//!
//! ```text
//! idle ──start──► starting ──► running ──close──► closing ──► closed
//!   │                │                               ▲
//!   └──close─────────┴──(close / startup failure)────┘
//! ```

use std::fmt;

use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Idle,
    Starting,
    Running,
    Closing,
    Closed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Starting => "starting",
            LifecycleState::Running => "running",
            LifecycleState::Closing => "closing",
            LifecycleState::Closed => "closed",
        })
    }
}

/// An operation was attempted in a state that doesn't allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("cannot {operation} while the bot is {state}")]
    InvalidState {
        operation: &'static str,
        state: LifecycleState,
    },

    #[error("the dispatch bus has been shut down")]
    BusClosed,
}

/// Current state plus change notifications.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    tx: watch::Sender<LifecycleState>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Lifecycle {
            tx: watch::Sender::new(LifecycleState::Idle),
        }
    }

    pub(crate) fn current(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }

    /// Moves to `to` if the current state is one of `from`, atomically.
    /// Returns the state that was left.
    pub(crate) fn transition(
        &self,
        operation: &'static str,
        from: &[LifecycleState],
        to: LifecycleState,
    ) -> Result<LifecycleState, LifecycleError> {
        let mut outcome = Err(LifecycleError::InvalidState {
            operation,
            state: LifecycleState::Idle,
        });
        self.tx.send_if_modified(|state| {
            if from.contains(state) {
                outcome = Ok(*state);
                *state = to;
                true
            } else {
                outcome = Err(LifecycleError::InvalidState {
                    operation,
                    state: *state,
                });
                false
            }
        });
        outcome
    }

    /// Unconditionally enters `state`.
    pub(crate) fn set(&self, state: LifecycleState) {
        self.tx.send_replace(state);
    }

    /// Resolves once the state satisfies `done`.
    pub(crate) async fn wait_until(&self, done: impl FnMut(&LifecycleState) -> bool) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel can't close while we wait.
        let _ = rx.wait_for(done).await;
    }
}

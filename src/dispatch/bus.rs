//! The dispatch bus.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use super::listener::{ErrorHook, Listener, ListenerError, ListenerFailure, log_failure};
use super::{RegistrationError, canonical_name};
use crate::bot::LifecycleError;
use crate::webhooks::Event;

/// Listener registry plus the task group running them.
///
/// Registration is append-only: registering the same callback twice runs it
/// twice. Listeners for one event run concurrently with no ordering guarantee
/// once spawned; they are spawned in registration order.
pub struct DispatchBus {
    listeners: DashMap<String, Vec<Listener>>,
    error_hook: RwLock<ErrorHook>,
    tracker: TaskTracker,
    cancel: CancellationToken,
    /// Dispatch spawns under the read side; shutdown flips it under the
    /// write side, so no task is spawned after the tracker closes.
    closed: RwLock<bool>,
}

impl Default for DispatchBus {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchBus {
    pub fn new() -> Self {
        DispatchBus {
            listeners: DashMap::new(),
            error_hook: RwLock::new(Arc::new(log_failure)),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
            closed: RwLock::new(false),
        }
    }

    /// Appends `listener` under `name`, returning the canonical key it was
    /// stored under.
    pub fn register(&self, name: &str, listener: Listener) -> Result<String, RegistrationError> {
        let key = canonical_name(name)?;
        self.listeners
            .entry(key.clone())
            .or_default()
            .push(listener);
        debug!(listener = %key, "registered listener");
        Ok(key)
    }

    /// Replaces the error hook. Failures already being reported still go to
    /// the previous hook.
    pub fn set_error_hook<F>(&self, hook: F)
    where
        F: Fn(ListenerFailure) + Send + Sync + 'static,
    {
        *self
            .error_hook
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(hook);
    }

    /// Number of listeners registered under `name` (any spelling).
    pub fn listener_count(&self, name: &str) -> usize {
        canonical_name(name)
            .ok()
            .and_then(|key| self.listeners.get(&key).map(|l| l.len()))
            .unwrap_or(0)
    }

    /// Listener tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawns one task per listener registered for `event` and returns how
    /// many were spawned, without waiting for any of them.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, event: Event) -> Result<usize, LifecycleError> {
        let closed = self.closed.read().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return Err(LifecycleError::BusClosed);
        }

        let key = event.listener_key();
        let listeners = match self.listeners.get(&key) {
            Some(entry) => entry.value().clone(),
            None => {
                debug!(listener = %key, "no listeners registered");
                return Ok(0);
            }
        };

        let event = Arc::new(event);
        let hook = Arc::clone(&self.error_hook.read().unwrap_or_else(PoisonError::into_inner));
        for (index, listener) in listeners.iter().enumerate() {
            let span = info_span!("listener", event = event.name(), index);
            self.tracker.spawn(
                run_listener(
                    listener.clone(),
                    Arc::clone(&event),
                    index,
                    self.cancel.clone(),
                    Arc::clone(&hook),
                )
                .instrument(span),
            );
        }
        Ok(listeners.len())
    }

    /// Stops accepting dispatches and drains running listeners.
    ///
    /// Waits up to `grace` for outstanding tasks, then cancels whatever is
    /// left. Returns `true` if everything finished within the grace period.
    #[instrument(skip(self))]
    pub async fn shutdown(&self, grace: Duration) -> bool {
        {
            let mut closed = self.closed.write().unwrap_or_else(PoisonError::into_inner);
            *closed = true;
            self.tracker.close();
        }

        let pending = self.tracker.len();
        if pending > 0 {
            info!(pending, "waiting for listeners to finish");
        }

        if tokio::time::timeout(grace, self.tracker.wait()).await.is_ok() {
            return true;
        }

        warn!(
            pending = self.tracker.len(),
            "grace period elapsed, cancelling listeners"
        );
        self.cancel.cancel();
        self.tracker.wait().await;
        false
    }
}

async fn run_listener(
    listener: Listener,
    event: Arc<Event>,
    index: usize,
    cancel: CancellationToken,
    hook: ErrorHook,
) {
    let name = event.name();
    let invocation = AssertUnwindSafe(async move { listener.call(event).await }).catch_unwind();

    let outcome = tokio::select! {
        _ = cancel.cancelled() => {
            debug!("listener cancelled");
            return;
        }
        outcome = invocation => outcome,
    };

    let error = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(e)) => ListenerError::Failed(e),
        Err(panic) => ListenerError::from_panic(panic),
    };
    hook(ListenerFailure {
        event: name,
        index,
        error,
    });
}

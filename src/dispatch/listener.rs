//! Listener callbacks and their failures.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::webhooks::Event;

/// The boxed future a listener returns.
pub type ListenerFuture = BoxFuture<'static, anyhow::Result<()>>;

/// An async event callback.
///
/// Any `Fn(Arc<Event>) -> impl Future<Output = anyhow::Result<()>>` converts
/// into a listener; synchronous callbacks don't type-check.
#[derive(Clone)]
pub struct Listener {
    callback: Arc<dyn Fn(Arc<Event>) -> ListenerFuture + Send + Sync>,
}

impl Listener {
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Listener {
            callback: Arc::new(move |event| callback(event).boxed()),
        }
    }

    pub(crate) fn call(&self, event: Arc<Event>) -> ListenerFuture {
        (self.callback)(event)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").finish_non_exhaustive()
    }
}

/// How a listener invocation went wrong.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("listener returned an error: {0:#}")]
    Failed(anyhow::Error),

    #[error("listener panicked: {0}")]
    Panicked(String),
}

impl ListenerError {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        ListenerError::Panicked(message)
    }
}

/// A listener failure as reported to the error hook.
#[derive(Debug, Error)]
#[error("listener {index} for `{event}` failed: {error}")]
pub struct ListenerFailure {
    /// Name of the event being handled.
    pub event: &'static str,
    /// Position of the listener in its registration list.
    pub index: usize,
    #[source]
    pub error: ListenerError,
}

/// Receives every listener failure.
pub type ErrorHook = Arc<dyn Fn(ListenerFailure) + Send + Sync>;

/// The hook installed until one is set: logs the failure.
pub fn log_failure(failure: ListenerFailure) {
    tracing::error!(
        event = failure.event,
        index = failure.index,
        error = %failure.error,
        "ignoring listener failure"
    );
}

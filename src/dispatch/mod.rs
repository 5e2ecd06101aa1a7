//! Fan-out of decoded events to registered listeners.
//!
//! Listeners are registered under a name and run as independent tracked tasks
//! when a matching event is dispatched. A listener that fails or panics is
//! reported to the bus's error hook; it never affects its siblings or the
//! webhook response.

pub mod bus;
pub mod listener;

pub use bus::DispatchBus;
pub use listener::{ErrorHook, Listener, ListenerError, ListenerFailure, ListenerFuture};

use thiserror::Error;

/// Errors registering a listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("listener name is empty")]
    EmptyName,

    #[error("listener name `{0}` contains whitespace")]
    InvalidName(String),
}

/// Canonical registry key for a listener name.
///
/// Trims, lowercases and adds the `on_` prefix if it is missing, so
/// `"Comment_Create"`, `"on_comment_create"` and `" ON_COMMENT_CREATE"` all map
/// to `on_comment_create`.
pub fn canonical_name(name: &str) -> Result<String, RegistrationError> {
    let lowered = name.trim().to_lowercase();
    let bare = lowered.strip_prefix("on_").unwrap_or(&lowered);
    if bare.is_empty() {
        return Err(RegistrationError::EmptyName);
    }
    if bare.chars().any(char::is_whitespace) {
        return Err(RegistrationError::InvalidName(name.to_string()));
    }
    Ok(format!("on_{bare}"))
}

//! State shared between the bot, the webhook endpoint and listeners.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use crate::dispatch::{DispatchBus, Listener, RegistrationError};
use crate::state::EntityCache;
use crate::types::{Application, Installation, InstallationId, Issue, IssueId, User, UserId};
use crate::webhooks::{Event, ParserRegistry};

use super::LifecycleError;

/// Cheaply clonable handle to the bot's cache, parser table and dispatch bus.
///
/// Listeners can capture a clone to look entities up while handling events.
#[derive(Clone)]
pub struct BotContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    cache: EntityCache,
    bus: DispatchBus,
    parsers: ParserRegistry,
    application: OnceLock<Arc<Application>>,
}

impl Default for BotContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BotContext {
    pub fn new() -> Self {
        BotContext {
            inner: Arc::new(ContextInner {
                cache: EntityCache::new(),
                bus: DispatchBus::new(),
                parsers: ParserRegistry::new(),
                application: OnceLock::new(),
            }),
        }
    }

    pub fn cache(&self) -> &EntityCache {
        &self.inner.cache
    }

    pub fn bus(&self) -> &DispatchBus {
        &self.inner.bus
    }

    pub fn parsers(&self) -> &ParserRegistry {
        &self.inner.parsers
    }

    /// The app identity from the startup handshake; `None` before `start`.
    pub fn application(&self) -> Option<Arc<Application>> {
        self.inner.application.get().cloned()
    }

    /// Records the app identity. Only the first call has an effect.
    pub(crate) fn set_application(&self, application: Arc<Application>) {
        let _ = self.inner.application.set(application);
    }

    pub fn get_user(&self, id: UserId) -> Option<Arc<User>> {
        self.inner.cache.user(id)
    }

    pub fn get_installation(&self, id: InstallationId) -> Option<Arc<Installation>> {
        self.inner.cache.installation(id)
    }

    pub fn get_issue(&self, id: IssueId) -> Option<Arc<Issue>> {
        self.inner.cache.issue(id)
    }

    /// Registers an async listener under `name` (`"comment_create"`,
    /// `"on_comment_create"` and `"Comment_Create"` are the same name).
    pub fn register<F, Fut>(&self, name: &str, listener: F) -> Result<String, RegistrationError>
    where
        F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.inner.bus.register(name, Listener::new(listener))
    }

    /// Schedules `event` on its listeners; see [`DispatchBus::dispatch`].
    pub fn dispatch(&self, event: Event) -> Result<usize, LifecycleError> {
        self.inner.bus.dispatch(event)
    }
}

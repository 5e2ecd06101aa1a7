//! The bot: startup handshake, webhook server and shutdown.
//!
//! ```no_run
//! use hubbot::{Bot, BotConfig};
//! use clap::Parser;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let bot = Bot::from_config(&BotConfig::parse())?;
//! bot.register("comment_create", |event| async move {
//!     tracing::info!(event = event.name(), "new comment");
//!     Ok::<_, anyhow::Error>(())
//! })?;
//! bot.run().await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod lifecycle;

pub use context::BotContext;
pub use lifecycle::{LifecycleError, LifecycleState};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::auth::{AppCredential, CredentialError, CredentialSigner};
use crate::config::{BotConfig, BotSettings};
use crate::dispatch::RegistrationError;
use crate::github::{ApiError, AppApi, GitHubClient};
use crate::server::{AppState, InvalidWebhookPath, build_router, validate_webhook_path};
use crate::types::{Application, Installation, InstallationId, Issue, IssueId, User, UserId};
use crate::webhooks::Event;

use lifecycle::Lifecycle;
use LifecycleState::{Closed, Closing, Idle, Running, Starting};

/// Startup and configuration failures.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("GitHub handshake failed: {0}")]
    Api(#[from] ApiError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    InvalidPath(#[from] InvalidWebhookPath),
}

struct ServerHandle {
    shutdown: CancellationToken,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    /// Stops accepting connections and waits for in-flight requests.
    async fn stop(self) {
        self.shutdown.cancel();
        match self.task.await {
            Ok(Ok(())) => debug!("webhook server stopped"),
            Ok(Err(e)) => warn!(error = %e, "webhook server exited with an error"),
            Err(e) => warn!(error = %e, "webhook server task failed"),
        }
    }
}

/// A GitHub App bot.
///
/// `A` is the outbound API used for the startup handshake; production code
/// uses [`GitHubClient`].
pub struct Bot<A: AppApi = GitHubClient> {
    settings: BotSettings,
    context: BotContext,
    api: Mutex<Option<Arc<A>>>,
    lifecycle: Lifecycle,
    server: tokio::sync::Mutex<Option<ServerHandle>>,
    /// Held for the duration of `start`.
    startup: tokio::sync::Mutex<()>,
}

impl Bot<GitHubClient> {
    /// Loads the app key and builds the GitHub client described by `config`.
    pub fn from_config(config: &BotConfig) -> Result<Self, BotError> {
        let credential = AppCredential::from_file(config.app_id(), &config.private_key_path)?
            .with_client(config.client_id.clone(), config.client_secret.clone());
        let client = GitHubClient::new(&config.api_base, CredentialSigner::new(credential))?;
        Ok(Bot::new(config.settings()?, client))
    }
}

impl<A: AppApi> Bot<A> {
    pub fn new(settings: BotSettings, api: A) -> Self {
        Bot {
            settings,
            context: BotContext::new(),
            api: Mutex::new(Some(Arc::new(api))),
            lifecycle: Lifecycle::new(),
            server: tokio::sync::Mutex::new(None),
            startup: tokio::sync::Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    /// Handle for listeners that need cache lookups.
    pub fn context(&self) -> &BotContext {
        &self.context
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.current()
    }

    pub fn is_closed(&self) -> bool {
        self.state() == Closed
    }

    pub fn application(&self) -> Option<Arc<Application>> {
        self.context.application()
    }

    pub fn get_user(&self, id: UserId) -> Option<Arc<User>> {
        self.context.get_user(id)
    }

    pub fn get_installation(&self, id: InstallationId) -> Option<Arc<Installation>> {
        self.context.get_installation(id)
    }

    pub fn get_issue(&self, id: IssueId) -> Option<Arc<Issue>> {
        self.context.get_issue(id)
    }

    /// Registers an async listener; see [`BotContext::register`].
    pub fn register<F, Fut>(&self, name: &str, listener: F) -> Result<String, RegistrationError>
    where
        F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.context.register(name, listener)
    }

    /// Schedules `event` on its listeners. Fails once the bot is closing.
    pub fn dispatch(&self, event: Event) -> Result<usize, LifecycleError> {
        let state = self.state();
        if matches!(state, Closing | Closed) {
            return Err(LifecycleError::InvalidState {
                operation: "dispatch",
                state,
            });
        }
        self.context.dispatch(event)
    }

    /// Performs the handshake and prefetch, then starts serving webhooks.
    ///
    /// Returns the bound address (useful with port 0). Any failure closes
    /// the bot. A [`close`](Self::close) issued meanwhile abandons startup,
    /// and this returns [`LifecycleError::InvalidState`].
    #[instrument(skip(self), fields(host = %self.settings.host, port = self.settings.port))]
    pub async fn start(&self) -> Result<SocketAddr, BotError> {
        self.lifecycle.transition("start", &[Idle], Starting)?;

        let outcome = {
            let _startup = self.startup.lock().await;
            tokio::select! {
                biased;
                outcome = self.start_inner() => outcome,
                _ = self.lifecycle.wait_until(|s| matches!(s, Closing | Closed)) => {
                    Err(self.not_starting().into())
                }
            }
        };

        match outcome {
            Ok(addr) => Ok(addr),
            Err(e) => {
                if matches!(self.state(), Closing | Closed) {
                    info!("startup abandoned by close");
                } else {
                    error!(error = %e, "startup failed");
                }
                if let BotError::Api(ApiError::GitHub(api)) = &e
                    && api.is_unauthorized()
                {
                    warn!("GitHub rejected the app token; check the app id and private key");
                }
                self.close().await;
                Err(e)
            }
        }
    }

    async fn start_inner(&self) -> Result<SocketAddr, BotError> {
        validate_webhook_path(&self.settings.webhook_path)?;
        self.ensure_starting()?;

        let api = self.api()?;
        self.prefetch(api.as_ref()).await?;
        drop(api);

        self.ensure_starting()?;
        let bind = (self.settings.host.as_str(), self.settings.port);
        let listener = TcpListener::bind(bind)
            .await
            .map_err(|source| BotError::Bind {
                addr: format!("{}:{}", bind.0, bind.1),
                source,
            })?;
        let addr = listener.local_addr().map_err(|source| BotError::Bind {
            addr: format!("{}:{}", bind.0, bind.1),
            source,
        })?;

        let router = build_router(
            AppState::new(
                self.context.clone(),
                self.settings.webhook_secret.clone(),
                self.settings.behind_proxy,
            ),
            &self.settings.webhook_path,
        )?;

        // The server is only spawned while holding the slot, and the handle
        // always lands in it, so `close` stops whatever was started.
        let mut server = self.server.lock().await;
        self.ensure_starting()?;
        let shutdown = CancellationToken::new();
        let serve = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.clone().cancelled_owned());
        *server = Some(ServerHandle {
            shutdown,
            task: tokio::spawn(async move { serve.await }),
        });
        let running = self.lifecycle.transition("start", &[Starting], Running);
        drop(server);
        running?;

        info!(
            %addr,
            path = %self.settings.webhook_path,
            "listening for webhooks"
        );
        self.context.dispatch(Event::Ready {
            host: addr.ip().to_string(),
            port: addr.port(),
        })?;
        Ok(addr)
    }

    /// Identifies the app and warms the cache.
    ///
    /// Nothing is written once the bot has left `starting`.
    async fn prefetch(&self, api: &A) -> Result<(), BotError> {
        let cache = self.context.cache();

        let app = api.fetch_app().await?;
        self.ensure_starting()?;
        cache.put(Arc::new(app.owner.clone()));
        info!(app_id = %app.id, name = %app.name, "authenticated as app");
        self.context.set_application(Arc::new(app));

        let installations = api.fetch_installations().await?;
        self.ensure_starting()?;
        let installation_count = installations.len();
        for installation in installations {
            cache.put(Arc::new(installation.account.clone()));
            cache.put(Arc::new(installation));
        }

        let issues = api.fetch_open_issues().await?;
        self.ensure_starting()?;
        let issue_count = match issues {
            Some(issues) => {
                let count = issues.len();
                for issue in issues {
                    cache.put(Arc::new(issue));
                }
                Some(count)
            }
            None => None,
        };

        info!(
            installations = installation_count,
            issues = ?issue_count,
            "prefetched entities"
        );
        Ok(())
    }

    fn not_starting(&self) -> LifecycleError {
        LifecycleError::InvalidState {
            operation: "start",
            state: self.state(),
        }
    }

    fn ensure_starting(&self) -> Result<(), LifecycleError> {
        match self.state() {
            Starting => Ok(()),
            _ => Err(self.not_starting()),
        }
    }

    fn api(&self) -> Result<Arc<A>, LifecycleError> {
        self.api
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| self.not_starting())
    }

    /// Stops the server, drains listeners and releases the GitHub client.
    ///
    /// Safe to call in any state; once closed, further calls return
    /// immediately.
    #[instrument(skip(self))]
    pub async fn close(&self) {
        if self
            .lifecycle
            .transition("close", &[Idle, Starting, Running], Closing)
            .is_err()
        {
            // Already closing or closed: wait for whoever is closing.
            self.lifecycle.wait_until(|s| *s == Closed).await;
            return;
        }
        info!("shutting down");

        // Let an in-flight start notice and unwind first.
        drop(self.startup.lock().await);

        let handle = self.server.lock().await.take();
        if let Some(handle) = handle {
            handle.stop().await;
        }

        let grace = self.settings.shutdown_grace;
        if !self.context.bus().shutdown(grace).await {
            warn!(?grace, "some listeners were cancelled");
        }

        self.api.lock().unwrap_or_else(PoisonError::into_inner).take();
        self.lifecycle.set(Closed);
        info!("closed");
    }

    /// Starts the bot and serves until SIGINT/SIGTERM or an external
    /// [`close`](Self::close), then shuts down.
    pub async fn run(&self) -> Result<(), BotError> {
        self.start().await?;

        tokio::select! {
            _ = shutdown_signal() => {}
            _ = self.lifecycle.wait_until(|s| matches!(s, Closing | Closed)) => {}
        }
        self.close().await;
        Ok(())
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

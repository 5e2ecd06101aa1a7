//! HTTP server for the bot.
//!
//! # Endpoints
//!
//! - `POST <webhook path>` - Accepts GitHub webhook deliveries (returns 200 OK)
//! - `GET /health` - Returns 200 with a small JSON report while the server is up

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use thiserror::Error;

pub mod health;
pub mod peer;
pub mod webhook;

pub use health::health_handler;
pub use peer::Peer;
pub use webhook::{MAX_BODY_BYTES, WebhookError, webhook_handler};

use crate::bot::BotContext;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    context: BotContext,

    /// Webhook secret for HMAC-SHA256 signature verification.
    webhook_secret: Vec<u8>,

    /// Take the client address from `X-Forwarded-*` headers.
    behind_proxy: bool,
}

impl AppState {
    pub fn new(context: BotContext, webhook_secret: impl Into<Vec<u8>>, behind_proxy: bool) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                context,
                webhook_secret: webhook_secret.into(),
                behind_proxy,
            }),
        }
    }

    pub fn context(&self) -> &BotContext {
        &self.inner.context
    }

    pub fn webhook_secret(&self) -> &[u8] {
        &self.inner.webhook_secret
    }

    pub fn behind_proxy(&self) -> bool {
        self.inner.behind_proxy
    }
}

/// Route of the liveness probe.
pub const HEALTH_PATH: &str = "/health";

/// A webhook path axum would refuse to route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid webhook path {path:?}: {reason}")]
pub struct InvalidWebhookPath {
    pub path: String,
    pub reason: &'static str,
}

/// Checks that `path` is a literal route: rooted, no captures or wildcards,
/// and not the health probe.
pub fn validate_webhook_path(path: &str) -> Result<(), InvalidWebhookPath> {
    let reason = if !path.starts_with('/') {
        Some("must start with `/`")
    } else if path.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("must not contain whitespace")
    } else if path.contains(['{', '}']) {
        Some("must not contain `{` or `}`")
    } else if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        Some("segments must not start with `:` or `*`")
    } else if path == HEALTH_PATH {
        Some("reserved for the health probe")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(InvalidWebhookPath {
            path: path.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Builds the router, serving webhooks at `webhook_path`.
pub fn build_router(
    app_state: AppState,
    webhook_path: &str,
) -> Result<axum::Router, InvalidWebhookPath> {
    use axum::routing::{get, post};

    validate_webhook_path(webhook_path)?;
    Ok(axum::Router::new()
        .route(webhook_path, post(webhook_handler))
        .route(HEALTH_PATH, get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state))
}

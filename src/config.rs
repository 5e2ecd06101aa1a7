//! Command-line and environment configuration.
//!
//! Every flag can also be set through a `HUBBOT_*` environment variable, which
//! is how secrets are expected to arrive in deployments.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::github::GITHUB_API_BASE;
use crate::server::{InvalidWebhookPath, validate_webhook_path};
use crate::types::AppId;

#[derive(Clone, Parser)]
#[command(name = "hubbot", version, about = "Run a GitHub App webhook bot")]
pub struct BotConfig {
    /// Numeric GitHub App id.
    #[arg(long, env = "HUBBOT_APP_ID")]
    pub app_id: u64,

    /// PEM file holding the app's RSA private key.
    #[arg(long, env = "HUBBOT_PRIVATE_KEY_PATH")]
    pub private_key_path: PathBuf,

    /// OAuth client id. Stored but unused by the webhook flow.
    #[arg(long, env = "HUBBOT_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret. Stored but unused by the webhook flow.
    #[arg(long, env = "HUBBOT_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Shared secret for `X-Hub-Signature-256`.
    #[arg(long, env = "HUBBOT_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: String,

    #[arg(long, env = "HUBBOT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "HUBBOT_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Route that receives webhook deliveries.
    #[arg(long, env = "HUBBOT_PATH", default_value = "/webhook")]
    pub path: String,

    /// Trust `X-Forwarded-For` / `X-Forwarded-Proto` for peer logging.
    #[arg(long, env = "HUBBOT_BEHIND_PROXY")]
    pub behind_proxy: bool,

    #[arg(long, env = "HUBBOT_API_BASE", default_value = GITHUB_API_BASE)]
    pub api_base: String,

    /// Seconds to let running listeners finish on shutdown.
    #[arg(long, env = "HUBBOT_SHUTDOWN_GRACE_SECS", default_value_t = 10)]
    pub shutdown_grace_secs: u64,
}

impl BotConfig {
    pub fn app_id(&self) -> AppId {
        AppId(self.app_id)
    }

    /// The runtime settings the bot needs once credentials are loaded.
    ///
    /// Fails if the webhook path is not a literal route.
    pub fn settings(&self) -> Result<BotSettings, InvalidWebhookPath> {
        let webhook_path = normalize_path(&self.path);
        validate_webhook_path(&webhook_path)?;
        Ok(BotSettings {
            host: self.host.clone(),
            port: self.port,
            webhook_path,
            webhook_secret: self.webhook_secret.clone().into_bytes(),
            behind_proxy: self.behind_proxy,
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
        })
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("app_id", &self.app_id)
            .field("private_key_path", &self.private_key_path)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("webhook_secret", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("behind_proxy", &self.behind_proxy)
            .field("api_base", &self.api_base)
            .field("shutdown_grace_secs", &self.shutdown_grace_secs)
            .finish()
    }
}

/// Where and how the webhook server listens.
#[derive(Clone)]
pub struct BotSettings {
    pub host: String,
    /// `0` picks a free port; [`Bot::start`](crate::Bot::start) returns it.
    pub port: u16,
    pub webhook_path: String,
    pub webhook_secret: Vec<u8>,
    pub behind_proxy: bool,
    pub shutdown_grace: Duration,
}

impl fmt::Debug for BotSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("webhook_path", &self.webhook_path)
            .field("webhook_secret", &"<redacted>")
            .field("behind_proxy", &self.behind_proxy)
            .field("shutdown_grace", &self.shutdown_grace)
            .finish()
    }
}

/// axum routes must start with `/`.
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

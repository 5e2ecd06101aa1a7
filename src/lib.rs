//! hubbot - a small framework for GitHub App bots.
//!
//! The bot authenticates as a GitHub App, warms an in-memory cache of
//! installations, then serves a webhook endpoint. Verified deliveries are
//! decoded into typed [`Event`]s and handed to async listeners registered by
//! name, each running isolated from the others.

pub mod auth;
pub mod bot;
pub mod config;
pub mod dispatch;
pub mod github;
pub mod server;
pub mod state;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub mod test_utils;

pub use bot::{Bot, BotContext, BotError, LifecycleError, LifecycleState};
pub use config::{BotConfig, BotSettings};
pub use webhooks::Event;

//! Outbound GitHub REST client.
//!
//! The bot talks to GitHub only as the app (JWT bearer auth): it identifies
//! itself with `GET /app` and lists its installations to warm the cache.
//! There is no retry or backoff; startup fails on the first error.

mod api;
mod client;
mod error;

pub use api::AppApi;
pub use client::{GITHUB_API_BASE, GitHubClient, PAGE_SIZE};
pub use error::{ApiError, GitHubApiError};

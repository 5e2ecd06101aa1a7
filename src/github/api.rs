//! The outbound calls the bot makes at startup.

use std::future::Future;

use super::error::ApiError;
use crate::types::{Application, Installation, Issue};

/// App-level GitHub REST operations, authenticated as the app itself.
///
/// [`GitHubClient`](super::GitHubClient) is the production implementation;
/// tests substitute canned responses.
pub trait AppApi: Send + Sync + 'static {
    /// `GET /app`: the app's own identity.
    fn fetch_app(&self) -> impl Future<Output = Result<Application, ApiError>> + Send;

    /// `GET /app/installations`, all pages.
    fn fetch_installations(
        &self,
    ) -> impl Future<Output = Result<Vec<Installation>, ApiError>> + Send;

    /// Open issues across installations, for warming the cache.
    ///
    /// `Ok(None)` means the implementation cannot list them; the prefetch
    /// skips issues in that case.
    fn fetch_open_issues(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<Issue>>, ApiError>> + Send {
        async { Ok(None) }
    }
}

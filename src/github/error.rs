//! GitHub API error types.

use std::fmt;
use thiserror::Error;

use crate::auth::CredentialError;

/// A failed GitHub REST call.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The HTTP status code, if the request got as far as a response.
    pub status_code: Option<u16>,

    /// What we were trying to do, plus the underlying message.
    pub message: String,

    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Wraps an octocrab error, keeping the response status when GitHub sent
    /// one.
    pub fn from_octocrab(context: &str, err: octocrab::Error) -> Self {
        let status_code = match &err {
            octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
            _ => None,
        };
        Self {
            status_code,
            message: format!("{context}: {err}"),
            source: Some(err),
        }
    }

    pub fn without_source(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// GitHub rejected our app JWT (bad key, wrong app id, clock skew).
    pub fn is_unauthorized(&self) -> bool {
        self.status_code == Some(401)
    }
}

/// Errors from the outbound client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Minting the app JWT failed; the request was never sent.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    GitHub(#[from] GitHubApiError),

    #[error("invalid authorization header: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
}

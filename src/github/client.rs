//! Octocrab-backed [`AppApi`].
//!
//! Every request carries a freshly minted app JWT. The underlying `Octocrab`
//! instance has no credentials of its own, and retries are disabled: a failed
//! call is reported to the caller as-is.

use http::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::api::AppApi;
use super::error::{ApiError, GitHubApiError};
use crate::auth::CredentialSigner;
use crate::types::{Application, Installation};

/// Default REST endpoint.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Largest page GitHub serves for listing endpoints.
pub const PAGE_SIZE: usize = 100;

const API_VERSION: &str = "2022-11-28";

#[derive(Serialize)]
struct PageQuery {
    per_page: usize,
    page: u32,
}

/// A GitHub REST client authenticated as the app.
#[derive(Clone)]
pub struct GitHubClient {
    client: Octocrab,
    signer: CredentialSigner,
}

impl GitHubClient {
    /// Builds a client against `base_uri` (normally [`GITHUB_API_BASE`]).
    pub fn new(base_uri: &str, signer: CredentialSigner) -> Result<Self, ApiError> {
        let client = Octocrab::builder()
            .base_uri(base_uri)
            .map_err(|e| GitHubApiError::from_octocrab("invalid API base URI", e))?
            .add_retry_config(RetryConfig::None)
            .build()
            .map_err(|e| GitHubApiError::from_octocrab("failed to build HTTP client", e))?;
        Ok(Self { client, signer })
    }

    pub fn signer(&self) -> &CredentialSigner {
        &self.signer
    }

    fn app_headers(&self) -> Result<HeaderMap, ApiError> {
        let token = self.signer.mint()?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&token.bearer())?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    async fn get<R, Q>(&self, route: &str, query: Option<&Q>) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let headers = self.app_headers()?;
        self.client
            .get_with_headers(route, query, Some(headers))
            .await
            .map_err(|e| GitHubApiError::from_octocrab(&format!("GET {route}"), e).into())
    }
}

impl AppApi for GitHubClient {
    #[instrument(skip(self))]
    async fn fetch_app(&self) -> Result<Application, ApiError> {
        let app: Application = self.get("/app", None::<&()>).await?;
        debug!(app_id = %app.id, name = %app.name, "identified app");
        Ok(app)
    }

    #[instrument(skip(self))]
    async fn fetch_installations(&self) -> Result<Vec<Installation>, ApiError> {
        let mut installations = Vec::new();
        for page in 1.. {
            let query = PageQuery {
                per_page: PAGE_SIZE,
                page,
            };
            let batch: Vec<Installation> = self.get("/app/installations", Some(&query)).await?;
            let last = batch.len() < PAGE_SIZE;
            debug!(page, count = batch.len(), "fetched installations page");
            installations.extend(batch);
            if last {
                break;
            }
        }
        Ok(installations)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("app_id", &self.signer.credential().app_id())
            .finish_non_exhaustive()
    }
}

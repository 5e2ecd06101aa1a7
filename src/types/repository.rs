//! Repositories.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ids::RepositoryId;
use super::installation::Installation;
use super::timestamp::Timestamp;
use super::user::User;

/// A repository snapshot taken from a webhook payload.
///
/// `installation` is not part of the repository payload: it is the cached
/// installation the delivery was sent for, resolved at decode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepositoryId,
    pub name: String,
    pub full_name: String,
    pub owner: User,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Timestamp,
    #[serde(default)]
    pub pushed_at: Timestamp,
    #[serde(default)]
    pub git_url: Option<String>,
    #[serde(default)]
    pub ssh_url: Option<String>,
    #[serde(default)]
    pub clone_url: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub has_issues: bool,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(skip)]
    pub installation: Option<Arc<Installation>>,
}

impl Repository {
    /// Returns the owner's login, e.g. `octocat` for `octocat/hello-world`.
    pub fn owner_login(&self) -> &str {
        &self.owner.login
    }

    /// Attaches the installation this repository was delivered under.
    pub fn with_installation(mut self, installation: Option<Arc<Installation>>) -> Self {
        self.installation = installation;
        self
    }
}

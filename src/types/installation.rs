//! App installations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::{AppId, InstallationId};
use super::timestamp::Timestamp;
use super::user::User;

/// An installation of the app on a user or organization account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    pub id: InstallationId,
    /// The account the app is installed on.
    pub account: User,
    #[serde(default)]
    pub app_id: Option<AppId>,
    #[serde(default)]
    pub app_slug: Option<String>,
    #[serde(default)]
    pub target_id: Option<u64>,
    /// `User` or `Organization`.
    #[serde(default)]
    pub target_type: Option<String>,
    /// `all` or `selected`.
    #[serde(default)]
    pub repository_selection: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub access_tokens_url: Option<String>,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Timestamp,
    #[serde(default)]
    pub suspended_at: Timestamp,
    #[serde(default)]
    pub permissions: BTreeMap<String, String>,
    #[serde(default)]
    pub events: Vec<String>,
}

impl Installation {
    /// Returns true if the installation has been suspended by the account.
    pub fn is_suspended(&self) -> bool {
        self.suspended_at.raw().is_some()
    }
}

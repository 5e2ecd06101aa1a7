//! Accounts: users, organizations, and the app's own identity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::{AppId, UserId};
use super::timestamp::Timestamp;

/// A GitHub account as embedded in payloads (`owner`, `user`, `sender`,
/// `account`). Organizations use the same shape with `account_type ==
/// "Organization"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// `User`, `Organization` or `Bot`.
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub site_admin: bool,
}

impl User {
    /// Returns true if this account is a bot (including GitHub Apps acting
    /// through their bot user).
    pub fn is_bot(&self) -> bool {
        self.account_type.as_deref() == Some("Bot")
    }
}

/// The app's own identity, as returned by `GET /app`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: AppId,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub node_id: Option<String>,
    pub owner: User,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Timestamp,
    /// Permission name to access level (`read` / `write`).
    #[serde(default)]
    pub permissions: BTreeMap<String, String>,
    /// Webhook events the app is subscribed to.
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub installations_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_minimal_fields() {
        let user: User = serde_json::from_value(json!({ "id": 1, "login": "octocat" })).unwrap();
        assert_eq!(user.id, UserId(1));
        assert_eq!(user.login, "octocat");
        assert!(user.account_type.is_none());
        assert!(!user.is_bot());
    }

    #[test]
    fn user_missing_login_is_rejected() {
        let result: Result<User, _> = serde_json::from_value(json!({ "id": 1 }));
        assert!(result.is_err());
    }

    #[test]
    fn bot_account_detected() {
        let user: User = serde_json::from_value(json!({
            "id": 41898282,
            "login": "github-actions[bot]",
            "type": "Bot"
        }))
        .unwrap();
        assert!(user.is_bot());
    }

    #[test]
    fn application_from_handshake_payload() {
        let app: Application = serde_json::from_value(json!({
            "id": 1234,
            "slug": "octoapp",
            "node_id": "MDExOkludGVncmF0aW9uMQ==",
            "owner": { "id": 1, "login": "github", "type": "Organization" },
            "name": "Octocat App",
            "description": "",
            "external_url": "https://example.com",
            "html_url": "https://github.com/apps/octoapp",
            "created_at": "2017-07-08T16:18:44-04:00",
            "updated_at": "2017-07-08T16:18:44-04:00",
            "permissions": { "issues": "write", "metadata": "read" },
            "events": ["issue_comment", "star"],
            "installations_count": 5
        }))
        .unwrap();

        assert_eq!(app.id, AppId(1234));
        assert_eq!(app.owner.login, "github");
        assert_eq!(app.permissions.get("issues").map(String::as_str), Some("write"));
        assert_eq!(app.events, vec!["issue_comment", "star"]);
        assert_eq!(app.created_at.raw(), Some("2017-07-08T16:18:44-04:00"));
        assert!(app.created_at.value().is_none());
    }
}

//! Issues and issue comments.
//!
//! Both carry a back-reference to their parent (`Comment -> Issue ->
//! Repository`), which is not part of the JSON object itself. They are built
//! from a payload fragment plus the already-decoded parent via
//! `from_payload`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ids::{CommentId, IssueId};
use super::repository::Repository;
use super::timestamp::Timestamp;
use super::user::User;

/// Whether an issue is open or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// Why a conversation was locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockReason {
    #[serde(rename = "off-topic")]
    OffTopic,
    #[serde(rename = "too heated")]
    TooHeated,
    #[serde(rename = "resolved")]
    Resolved,
    #[serde(rename = "spam")]
    Spam,
}

#[derive(Deserialize)]
struct RawIssue {
    id: IssueId,
    #[serde(default)]
    node_id: Option<String>,
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    user: User,
    state: IssueState,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    active_lock_reason: Option<LockReason>,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    created_at: Timestamp,
    #[serde(default)]
    updated_at: Timestamp,
    #[serde(default)]
    closed_at: Timestamp,
    #[serde(default)]
    author_association: Option<String>,
    #[serde(default)]
    pull_request: Option<Value>,
}

/// An issue (or pull request, which GitHub also reports as an issue).
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub id: IssueId,
    pub node_id: Option<String>,
    /// Per-repository number, as shown in `#123`.
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub user: User,
    pub state: IssueState,
    pub locked: bool,
    pub active_lock_reason: Option<LockReason>,
    /// Comment count at the time of the snapshot.
    pub comments: u64,
    pub url: Option<String>,
    pub html_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub closed_at: Timestamp,
    pub author_association: Option<String>,
    pub is_pull_request: bool,
    pub repository: Arc<Repository>,
}

impl Issue {
    /// Builds an issue from its JSON object, attaching the repository it
    /// belongs to.
    pub fn from_payload(
        value: &Value,
        repository: Arc<Repository>,
    ) -> Result<Self, serde_json::Error> {
        let raw = RawIssue::deserialize(value)?;
        Ok(Issue {
            id: raw.id,
            node_id: raw.node_id,
            number: raw.number,
            title: raw.title,
            body: raw.body,
            user: raw.user,
            state: raw.state,
            locked: raw.locked,
            active_lock_reason: raw.active_lock_reason,
            comments: raw.comments,
            url: raw.url,
            html_url: raw.html_url,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            closed_at: raw.closed_at,
            author_association: raw.author_association,
            is_pull_request: raw.pull_request.is_some_and(|v| !v.is_null()),
            repository,
        })
    }

    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }
}

#[derive(Deserialize)]
struct RawComment {
    id: CommentId,
    #[serde(default)]
    node_id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    body: String,
    user: User,
    #[serde(default)]
    created_at: Timestamp,
    #[serde(default)]
    updated_at: Timestamp,
    #[serde(default)]
    issue_url: Option<String>,
    #[serde(default)]
    author_association: Option<String>,
}

/// A comment on an issue or pull request conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub node_id: Option<String>,
    pub url: Option<String>,
    pub html_url: Option<String>,
    pub body: String,
    pub user: User,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub issue_url: Option<String>,
    /// `OWNER`, `MEMBER`, `CONTRIBUTOR`, `NONE`, ...
    pub author_association: Option<String>,
    pub issue: Arc<Issue>,
}

impl Comment {
    pub fn from_payload(value: &Value, issue: Arc<Issue>) -> Result<Self, serde_json::Error> {
        let raw = RawComment::deserialize(value)?;
        Ok(Comment {
            id: raw.id,
            node_id: raw.node_id,
            url: raw.url,
            html_url: raw.html_url,
            body: raw.body,
            user: raw.user,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            issue_url: raw.issue_url,
            author_association: raw.author_association,
            issue,
        })
    }

    /// The comment's author.
    pub fn author(&self) -> &User {
        &self.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{comment_json, issue_json, repository_json};
    use crate::types::UserId;
    use serde_json::json;

    fn repo() -> Arc<Repository> {
        Arc::new(serde_json::from_value(repository_json(42, "octocat", "hello-world")).unwrap())
    }

    #[test]
    fn issue_keeps_repository_back_reference() {
        let repository = repo();
        let issue = Issue::from_payload(&issue_json(7, 3), Arc::clone(&repository)).unwrap();

        assert_eq!(issue.id, IssueId(7));
        assert_eq!(issue.number, 3);
        assert!(issue.is_open());
        assert!(!issue.is_pull_request);
        assert!(Arc::ptr_eq(&issue.repository, &repository));
    }

    #[test]
    fn pull_request_marker_detected() {
        let mut payload = issue_json(7, 3);
        payload["pull_request"] = json!({ "url": "https://api.github.com/repos/o/r/pulls/3" });
        let issue = Issue::from_payload(&payload, repo()).unwrap();
        assert!(issue.is_pull_request);
    }

    #[test]
    fn lock_reason_uses_github_spelling() {
        let mut payload = issue_json(7, 3);
        payload["locked"] = json!(true);
        payload["active_lock_reason"] = json!("too heated");
        let issue = Issue::from_payload(&payload, repo()).unwrap();
        assert!(issue.locked);
        assert_eq!(issue.active_lock_reason, Some(LockReason::TooHeated));
    }

    #[test]
    fn unknown_state_is_rejected() {
        let mut payload = issue_json(7, 3);
        payload["state"] = json!("archived");
        assert!(Issue::from_payload(&payload, repo()).is_err());
    }

    #[test]
    fn comment_chain_reaches_repository() {
        let issue = Arc::new(Issue::from_payload(&issue_json(7, 3), repo()).unwrap());
        let comment = Comment::from_payload(&comment_json(99, "hello"), Arc::clone(&issue)).unwrap();

        assert_eq!(comment.id, CommentId(99));
        assert_eq!(comment.body, "hello");
        assert_eq!(comment.author().id, UserId(1));
        assert_eq!(comment.issue.repository.id.get(), 42);
    }

    #[test]
    fn comment_without_user_is_rejected() {
        let issue = Arc::new(Issue::from_payload(&issue_json(7, 3), repo()).unwrap());
        let result = Comment::from_payload(&json!({ "id": 99, "body": "x" }), issue);
        assert!(result.is_err());
    }
}

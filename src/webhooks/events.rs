//! Typed events handed to listeners.
//!
//! Each variant is one logical event. Its name (see [`Event::name`]) selects
//! the listeners, which are registered as `on_<name>`; its fields, in
//! declaration order, are the event's arguments.
//!
//! | Event                     | Source delivery           | Arguments                                      |
//! |---------------------------|---------------------------|------------------------------------------------|
//! | `ready`                   | bot startup               | host, port                                     |
//! | `ping`                    | `ping`                    | zen, hook_id                                   |
//! | `repository_star_update`  | `star`                    | action, repository                             |
//! | `comment_create`          | `issue_comment` created   | comment, issue, repository, sender             |
//! | `comment_edit`            | `issue_comment` edited    | changes, comment, issue, repository, sender    |

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Comment, Issue, Repository, User};

/// Whether a repository gained or lost a star.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarAction {
    Created,
    Deleted,
}

impl fmt::Display for StarAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StarAction::Created => "created",
            StarAction::Deleted => "deleted",
        })
    }
}

/// A decoded event ready for dispatch.
#[derive(Debug, Clone)]
pub enum Event {
    /// The bot finished starting and is accepting deliveries.
    Ready { host: String, port: u16 },

    /// GitHub confirmed the webhook is wired up.
    Ping { zen: String, hook_id: u64 },

    /// A repository was starred or unstarred.
    RepositoryStarUpdate {
        action: StarAction,
        repository: Arc<Repository>,
    },

    CommentCreate {
        comment: Arc<Comment>,
        issue: Arc<Issue>,
        repository: Arc<Repository>,
        sender: Arc<User>,
    },

    /// A comment body was edited. `changes` is GitHub's diff object, e.g.
    /// `{"body": {"from": "old text"}}`.
    CommentEdit {
        changes: Value,
        comment: Arc<Comment>,
        issue: Arc<Issue>,
        repository: Arc<Repository>,
        sender: Arc<User>,
    },
}

impl Event {
    /// Every event name, in table order.
    pub const NAMES: [&'static str; 5] = [
        "ready",
        "ping",
        "repository_star_update",
        "comment_create",
        "comment_edit",
    ];

    /// The logical event name listeners subscribe to.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Ready { .. } => "ready",
            Event::Ping { .. } => "ping",
            Event::RepositoryStarUpdate { .. } => "repository_star_update",
            Event::CommentCreate { .. } => "comment_create",
            Event::CommentEdit { .. } => "comment_edit",
        }
    }

    /// The registry key for this event's listeners (`on_<name>`).
    pub fn listener_key(&self) -> String {
        format!("on_{}", self.name())
    }

    /// The repository the event concerns, if any.
    pub fn repository(&self) -> Option<&Arc<Repository>> {
        match self {
            Event::RepositoryStarUpdate { repository, .. }
            | Event::CommentCreate { repository, .. }
            | Event::CommentEdit { repository, .. } => Some(repository),
            Event::Ready { .. } | Event::Ping { .. } => None,
        }
    }
}

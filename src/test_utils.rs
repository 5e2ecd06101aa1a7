//! Shared test fixtures: GitHub-shaped JSON payloads and property generators.

use std::io;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use serde_json::{Value, json};

use crate::webhooks::signature::{compute_signature, format_signature_header};

pub const TEST_SECRET: &[u8] = b"It's a Secret to Everybody";

/// PKCS#1 private key for app JWT tests.
pub const TEST_PRIVATE_KEY: &[u8] = include_bytes!("../tests/fixtures/test_app_key.pem");

/// SPKI public half of [`TEST_PRIVATE_KEY`].
pub const TEST_PUBLIC_KEY: &[u8] = include_bytes!("../tests/fixtures/test_app_key.pub.pem");

/// Returns the `X-Hub-Signature-256` value GitHub would send for `body`.
pub fn sign_body(secret: &[u8], body: &[u8]) -> String {
    format_signature_header(&compute_signature(body, secret))
}

/// Formatted log output collected from the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Routes this thread's events into the capture until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn user_json(id: u64, login: &str) -> Value {
    json!({
        "login": login,
        "id": id,
        "node_id": format!("MDQ6VXNlcn{id}"),
        "avatar_url": format!("https://avatars.githubusercontent.com/u/{id}?v=4"),
        "url": format!("https://api.github.com/users/{login}"),
        "html_url": format!("https://github.com/{login}"),
        "type": "User",
        "site_admin": false
    })
}

pub fn repository_json(id: u64, owner: &str, name: &str) -> Value {
    json!({
        "id": id,
        "node_id": "MDEwOlJlcG9zaXRvcnkxMjk2MjY5",
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "private": false,
        "owner": user_json(1, owner),
        "html_url": format!("https://github.com/{owner}/{name}"),
        "description": null,
        "fork": false,
        "url": format!("https://api.github.com/repos/{owner}/{name}"),
        "created_at": "2011-01-26T19:01:12Z",
        "updated_at": "2011-01-26T19:14:43Z",
        "pushed_at": "2011-01-26T19:06:43Z",
        "homepage": null,
        "size": 108,
        "stargazers_count": 80,
        "watchers_count": 80,
        "language": "Rust",
        "has_issues": true,
        "has_wiki": true,
        "forks_count": 9,
        "archived": false,
        "disabled": false,
        "open_issues_count": 0,
        "is_template": false,
        "topics": [],
        "visibility": "public",
        "default_branch": "main"
    })
}

pub fn issue_json(id: u64, number: u64) -> Value {
    json!({
        "id": id,
        "node_id": "MDU6SXNzdWUx",
        "number": number,
        "title": "Found a bug",
        "body": "I'm having a problem with this.",
        "user": user_json(1, "octocat"),
        "state": "open",
        "locked": false,
        "active_lock_reason": null,
        "comments": 1,
        "url": format!("https://api.github.com/repos/octocat/hello-world/issues/{number}"),
        "html_url": format!("https://github.com/octocat/hello-world/issues/{number}"),
        "created_at": "2011-04-22T13:33:48Z",
        "updated_at": "2011-04-22T13:33:48Z",
        "closed_at": null,
        "author_association": "OWNER"
    })
}

pub fn comment_json(id: u64, body: &str) -> Value {
    json!({
        "id": id,
        "node_id": "MDEyOklzc3VlQ29tbWVudDE=",
        "url": format!("https://api.github.com/repos/octocat/hello-world/issues/comments/{id}"),
        "html_url": format!("https://github.com/octocat/hello-world/issues/3#issuecomment-{id}"),
        "body": body,
        "user": user_json(1, "octocat"),
        "created_at": "2011-04-14T16:00:49Z",
        "updated_at": "2011-04-14T16:00:49Z",
        "issue_url": "https://api.github.com/repos/octocat/hello-world/issues/3",
        "author_association": "OWNER"
    })
}

pub fn installation_json(id: u64, account_id: u64, login: &str) -> Value {
    json!({
        "id": id,
        "account": user_json(account_id, login),
        "app_id": 1234,
        "app_slug": "hubbot",
        "target_id": account_id,
        "target_type": "User",
        "repository_selection": "all",
        "html_url": format!("https://github.com/settings/installations/{id}"),
        "access_tokens_url": format!("https://api.github.com/app/installations/{id}/access_tokens"),
        "created_at": "2018-02-09T20:51:14Z",
        "updated_at": "2018-02-09T20:51:14Z",
        "suspended_at": null,
        "permissions": { "issues": "write", "metadata": "read" },
        "events": ["issue_comment", "star"]
    })
}

pub fn application_json(id: u64, owner_id: u64, owner_login: &str) -> Value {
    json!({
        "id": id,
        "slug": "hubbot",
        "node_id": "MDExOkludGVncmF0aW9uMQ==",
        "owner": user_json(owner_id, owner_login),
        "name": "hubbot",
        "description": "Relays webhook events",
        "external_url": "https://example.com",
        "html_url": "https://github.com/apps/hubbot",
        "created_at": "2017-07-08T16:18:44-04:00",
        "updated_at": "2017-07-08T16:18:44-04:00",
        "permissions": { "issues": "write", "metadata": "read" },
        "events": ["issue_comment", "star"],
        "installations_count": 2
    })
}

/// A `star` delivery for repository `repo_id`.
pub fn star_payload(action: &str, repo_id: u64) -> Value {
    json!({
        "action": action,
        "starred_at": "2024-01-15T12:00:00Z",
        "repository": repository_json(repo_id, "octocat", "hello-world"),
        "sender": user_json(2, "stargazer")
    })
}

/// An `issue_comment` delivery; `installation` is included when given.
pub fn issue_comment_payload(action: &str, installation: Option<u64>) -> Value {
    let mut payload = json!({
        "action": action,
        "issue": issue_json(7, 3),
        "comment": comment_json(99, "looks good"),
        "repository": repository_json(42, "octocat", "hello-world"),
        "sender": user_json(5, "commenter")
    });
    if action == "edited" {
        payload["changes"] = json!({ "body": { "from": "looks bad" } });
    }
    if let Some(id) = installation {
        payload["installation"] = json!({ "id": id, "node_id": "MDIzOkludGVncmF0aW9uSW5zdGFsbGF0aW9uMQ==" });
    }
    payload
}

pub fn ping_payload(hook_id: u64) -> Value {
    json!({
        "zen": "Keep it logically awesome.",
        "hook_id": hook_id,
        "hook": { "type": "App", "id": hook_id, "active": true, "events": ["issue_comment", "star"] }
    })
}

/// Listener names in arbitrary case, with or without the `on_` prefix, and
/// with stray surrounding whitespace.
pub fn arb_listener_spelling(canonical: &'static str) -> impl Strategy<Value = String> {
    (
        prop::collection::vec(any::<bool>(), canonical.len() + 3),
        any::<bool>(),
        "[ \t]{0,2}",
        "[ \t]{0,2}",
    )
        .prop_map(move |(upper, prefixed, lead, trail)| {
            let base = if prefixed {
                format!("on_{canonical}")
            } else {
                canonical.to_string()
            };
            let cased: String = base
                .chars()
                .zip(upper.iter().chain(std::iter::repeat(&false)))
                .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
                .collect();
            format!("{lead}{cased}{trail}")
        })
}

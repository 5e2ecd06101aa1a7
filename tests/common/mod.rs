//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use hubbot::auth::{AppCredential, CredentialSigner};
use hubbot::types::AppId;
use hubbot::webhooks::{compute_signature, format_signature_header};

pub const APP_ID: u64 = 1234;
pub const PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/test_app_key.pem");
pub const PUBLIC_KEY: &[u8] = include_bytes!("../fixtures/test_app_key.pub.pem");

pub fn signer() -> CredentialSigner {
    let credential = AppCredential::from_pem(AppId(APP_ID), PRIVATE_KEY).unwrap();
    CredentialSigner::new(credential)
}

pub fn user_json(id: u64, login: &str) -> Value {
    json!({
        "login": login,
        "id": id,
        "node_id": format!("U_{id}"),
        "url": format!("https://api.github.com/users/{login}"),
        "html_url": format!("https://github.com/{login}"),
        "type": "User",
        "site_admin": false
    })
}

pub fn application_json() -> Value {
    json!({
        "id": APP_ID,
        "slug": "hubbot",
        "owner": user_json(900, "app-owner"),
        "name": "hubbot",
        "permissions": { "issues": "write" },
        "events": ["issue_comment", "star"]
    })
}

pub fn installation_json(id: u64, account_id: u64, login: &str) -> Value {
    json!({
        "id": id,
        "account": user_json(account_id, login),
        "app_id": APP_ID,
        "app_slug": "hubbot",
        "target_id": account_id,
        "target_type": "User",
        "repository_selection": "all",
        "created_at": "2018-02-09T20:51:14Z",
        "updated_at": "2018-02-09T20:51:14Z",
        "suspended_at": null,
        "permissions": { "issues": "write" },
        "events": ["issue_comment"]
    })
}

pub fn star_payload(action: &str) -> Value {
    json!({
        "action": action,
        "starred_at": "2024-01-15T12:00:00Z",
        "repository": {
            "id": 42,
            "name": "hello-world",
            "full_name": "octocat/hello-world",
            "owner": user_json(1, "octocat"),
            "private": false
        },
        "sender": user_json(2, "stargazer")
    })
}

/// A minimal HTTP/1.1 response: status code plus body.
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// POSTs `body` to `path` over a fresh connection, signing it with `secret`
/// when given.
pub async fn post_webhook(
    addr: SocketAddr,
    path: &str,
    event: &str,
    body: &[u8],
    secret: Option<&[u8]>,
) -> RawResponse {
    let mut request = format!(
        "POST {path} HTTP/1.1\r\n\
         Host: {addr}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         X-GitHub-Event: {event}\r\n\
         X-GitHub-Delivery: 72d3162e-cc78-11e3-81ab-4c9367dc0958\r\n",
        body.len()
    );
    if let Some(secret) = secret {
        let signature = format_signature_header(&compute_signature(body, secret));
        request.push_str(&format!("X-Hub-Signature-256: {signature}\r\n"));
    }
    request.push_str("\r\n");

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    stream.write_all(body).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8_lossy(&raw).into_owned();

    let status = raw
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    let body = raw
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    RawResponse { status, body }
}

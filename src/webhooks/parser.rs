//! Webhook payload decoders.
//!
//! [`ParserRegistry`] is a fixed table from `X-GitHub-Event` value to a decode
//! function. A decoder receives the parsed JSON body and the entity cache and
//! returns:
//!
//! * `Ok(Some(event))` - an event to dispatch
//! * `Ok(None)` - a recognised delivery whose action we don't handle (logged)
//! * `Err(e)` - the payload is missing a required field or has a bad value
//!
//! Decoders never write to the cache. They only read it to attach the
//! installation a delivery was sent for.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::state::EntityCache;
use crate::types::{Comment, InstallationId, Issue, Repository, User};

use super::events::{Event, StarAction};

/// Error type for webhook decoding failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A required top-level key is absent or `null`.
    #[error("payload is missing `{0}`")]
    MissingField(&'static str),

    /// A sub-object failed to deserialize (includes missing nested fields).
    #[error("invalid `{field}` object: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Field has a value we don't accept (e.g. an unknown `action`).
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("no decoder for event type `{0}`")]
    UnsupportedEvent(String),
}

/// A decode function: payload and cache in, optional event out.
pub type DecodeFn = fn(&Value, &EntityCache) -> Result<Option<Event>, ParseError>;

const DECODERS: &[(&str, DecodeFn)] = &[
    ("issue_comment", decode_issue_comment),
    ("ping", decode_ping),
    ("star", decode_star),
];

/// Event type to decoder table, built once per bot.
#[derive(Debug, Clone)]
pub struct ParserRegistry {
    decoders: BTreeMap<&'static str, DecodeFn>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserRegistry {
    pub fn new() -> Self {
        ParserRegistry {
            decoders: DECODERS.iter().copied().collect(),
        }
    }

    /// Whether deliveries of `event_type` are decoded.
    pub fn supports(&self, event_type: &str) -> bool {
        self.decoders.contains_key(event_type)
    }

    /// The handled `X-GitHub-Event` values, sorted.
    pub fn event_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.keys().copied()
    }

    /// Decodes one delivery.
    pub fn decode(
        &self,
        event_type: &str,
        payload: &Value,
        cache: &EntityCache,
    ) -> Result<Option<Event>, ParseError> {
        let decode = self
            .decoders
            .get(event_type)
            .ok_or_else(|| ParseError::UnsupportedEvent(event_type.to_string()))?;
        decode(payload, cache)
    }
}

// ============================================================================
// Field helpers
// ============================================================================

fn field<'a>(payload: &'a Value, name: &'static str) -> Result<&'a Value, ParseError> {
    payload
        .get(name)
        .filter(|v| !v.is_null())
        .ok_or(ParseError::MissingField(name))
}

fn string_field<'a>(payload: &'a Value, name: &'static str) -> Result<&'a str, ParseError> {
    let value = field(payload, name)?;
    value.as_str().ok_or_else(|| ParseError::InvalidField {
        field: name,
        value: value.to_string(),
    })
}

fn entity<T: DeserializeOwned>(payload: &Value, name: &'static str) -> Result<T, ParseError> {
    T::deserialize(field(payload, name)?).map_err(|source| ParseError::Field {
        field: name,
        source,
    })
}

/// Builds the delivery's repository, attaching the cached installation named
/// by the payload's top-level `installation.id`, if we know it.
fn repository(payload: &Value, cache: &EntityCache) -> Result<Arc<Repository>, ParseError> {
    let installation = payload
        .get("installation")
        .and_then(|i| i.get("id"))
        .and_then(Value::as_u64)
        .and_then(|id| cache.installation(InstallationId(id)));

    let repository: Repository = entity(payload, "repository")?;
    Ok(Arc::new(repository.with_installation(installation)))
}

// ============================================================================
// star
// ============================================================================

fn decode_star(payload: &Value, cache: &EntityCache) -> Result<Option<Event>, ParseError> {
    let action = match string_field(payload, "action")? {
        "created" => StarAction::Created,
        "deleted" => StarAction::Deleted,
        other => {
            return Err(ParseError::InvalidField {
                field: "action",
                value: other.to_string(),
            });
        }
    };

    Ok(Some(Event::RepositoryStarUpdate {
        action,
        repository: repository(payload, cache)?,
    }))
}

// ============================================================================
// issue_comment
// ============================================================================

fn decode_issue_comment(payload: &Value, cache: &EntityCache) -> Result<Option<Event>, ParseError> {
    let action = string_field(payload, "action")?;
    if !matches!(action, "created" | "edited") {
        info!(action, "ignoring unhandled issue_comment action");
        return Ok(None);
    }

    let repository = repository(payload, cache)?;
    let issue = Arc::new(
        Issue::from_payload(field(payload, "issue")?, Arc::clone(&repository))
            .map_err(|source| ParseError::Field { field: "issue", source })?,
    );
    let comment = Arc::new(
        Comment::from_payload(field(payload, "comment")?, Arc::clone(&issue))
            .map_err(|source| ParseError::Field { field: "comment", source })?,
    );
    let sender: Arc<User> = Arc::new(entity(payload, "sender")?);

    let event = if action == "edited" {
        Event::CommentEdit {
            changes: field(payload, "changes")?.clone(),
            comment,
            issue,
            repository,
            sender,
        }
    } else {
        Event::CommentCreate {
            comment,
            issue,
            repository,
            sender,
        }
    };
    Ok(Some(event))
}

// ============================================================================
// ping
// ============================================================================

fn decode_ping(payload: &Value, _cache: &EntityCache) -> Result<Option<Event>, ParseError> {
    let zen = string_field(payload, "zen")?.to_string();
    let hook = field(payload, "hook_id")?;
    let hook_id = hook.as_u64().ok_or_else(|| ParseError::InvalidField {
        field: "hook_id",
        value: hook.to_string(),
    })?;
    Ok(Some(Event::Ping { zen, hook_id }))
}

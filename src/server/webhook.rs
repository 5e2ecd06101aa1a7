//! Webhook endpoint handler.
//!
//! Authenticates a delivery, decodes it and schedules its listeners, then
//! answers `200 OK` with an empty body. The response never waits on listeners.

use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::AppState;
use super::peer::Peer;
use crate::types::DeliveryId;
use crate::webhooks::{SignatureError, check_signature};

/// Header name for GitHub event type.
pub const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
pub const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
pub const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// GitHub caps webhook payloads at 25 MiB.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid signature: {0}")]
    Signature(#[from] SignatureError),

    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Body could not be read or exceeded [`MAX_BODY_BYTES`].
    #[error("unreadable request body: {0}")]
    Body(String),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::Signature(_) => StatusCode::UNAUTHORIZED,
            WebhookError::MissingHeader(_)
            | WebhookError::InvalidJson(_)
            | WebhookError::Body(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// `POST <webhook path>`.
///
/// | Condition                               | Response |
/// |-----------------------------------------|----------|
/// | signature missing, malformed, or wrong  | 401      |
/// | body not JSON, too large                | 400      |
/// | event or delivery header missing        | 400      |
/// | event type not handled                  | 200      |
/// | payload fails to decode                 | 200 (logged, dropped) |
/// | decoded and scheduled                   | 200      |
pub async fn webhook_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<StatusCode, WebhookError> {
    let (parts, body) = request.into_parts();
    let peer = Peer::from_parts(&parts, state.behind_proxy());

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| WebhookError::Body(e.to_string()))?;

    // Authenticate the raw bytes before anything looks at them.
    let signature = parts
        .headers
        .get(HEADER_SIGNATURE)
        .and_then(|v| v.to_str().ok());
    if let Err(e) = check_signature(&body, signature, state.webhook_secret()) {
        warn!(peer = %peer, error = %e, "rejecting webhook");
        return Err(e.into());
    }

    let payload: Value = serde_json::from_slice(&body)?;
    let event_type = get_header(&parts.headers, HEADER_EVENT)?;
    let delivery_id = DeliveryId::new(get_header(&parts.headers, HEADER_DELIVERY)?);

    debug!(
        peer = %peer,
        delivery_id = %delivery_id,
        event_type = %event_type,
        "Received webhook"
    );

    let context = state.context();
    if !context.parsers().supports(&event_type) {
        info!(
            delivery_id = %delivery_id,
            event_type = %event_type,
            "ignoring unhandled event type"
        );
        return Ok(StatusCode::OK);
    }

    match context
        .parsers()
        .decode(&event_type, &payload, context.cache())
    {
        Ok(Some(event)) => {
            let name = event.name();
            match context.dispatch(event) {
                Ok(scheduled) => debug!(
                    delivery_id = %delivery_id,
                    event = name,
                    scheduled,
                    "dispatched event"
                ),
                Err(e) => warn!(
                    delivery_id = %delivery_id,
                    event = name,
                    error = %e,
                    "dropping event"
                ),
            }
        }
        Ok(None) => {}
        Err(e) => error!(
            delivery_id = %delivery_id,
            event_type = %event_type,
            error = %e,
            "failed to decode webhook payload"
        ),
    }

    Ok(StatusCode::OK)
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}

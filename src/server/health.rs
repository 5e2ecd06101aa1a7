//! Liveness probe.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::AppState;
use crate::state::EntityKind;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HealthReport {
    pub status: &'static str,
    pub installations: usize,
    pub listeners_in_flight: usize,
}

/// `GET /health`: always 200 while the server is up, with a few gauges.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    let context = state.context();
    Json(HealthReport {
        status: "ok",
        installations: context.cache().count(EntityKind::Installation),
        listeners_in_flight: context.bus().in_flight(),
    })
}

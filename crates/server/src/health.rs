use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use supportdesk_core::catalog::ProductCatalog;

#[derive(Clone)]
pub struct HealthState {
    catalog: Arc<ProductCatalog>,
    model: String,
}

impl HealthState {
    pub fn new(catalog: Arc<ProductCatalog>, model: impl Into<String>) -> Self {
        Self { catalog, model: model.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub model: String,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Liveness plus what bootstrap loaded. Catalog validation happens before the
/// listener binds.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "supportdesk-server runtime initialized".to_string(),
        },
        catalog: HealthCheck {
            status: "ready",
            detail: format!("{} products loaded", state.catalog.len()),
        },
        model: state.model.clone(),
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

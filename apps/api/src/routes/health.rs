//! `GET /health`: liveness, database reachability and migration state.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_migrations: Option<usize>,
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    if !state.db.health_check().await {
        tracing::warn!("Health check failed: database unreachable");
        return unavailable("unreachable", None);
    }

    match state.db.migration_status().await {
        Ok((total, applied)) if applied >= total => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: "connected",
                pending_migrations: Some(0),
            }),
        ),
        Ok((total, applied)) => {
            tracing::warn!(total, applied, "Health check failed: migrations pending");
            unavailable("connected", Some(total - applied))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed: migration status unknown");
            unavailable("connected", None)
        }
    }
}

fn unavailable(
    database: &'static str,
    pending_migrations: Option<usize>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthResponse {
            status: "unavailable",
            database,
            pending_migrations,
        }),
    )
}

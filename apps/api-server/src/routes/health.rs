//! Liveness and schema status.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;
use medicare_db::migrations::migration_status;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub migrations_applied: usize,
    pub migrations_total: usize,
}

/// `GET /api/health`
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let healthy = state.db.health_check().await;
    let (total, applied) = match migration_status(state.db.pool()).await {
        Ok(status) => status,
        Err(e) => {
            warn!(error = %e, "Could not read migration status");
            (0, 0)
        }
    };

    let ready = healthy && total > 0 && applied == total;
    Json(HealthResponse {
        status: if ready { "ok" } else { "degraded" },
        database: if healthy { "ok" } else { "unavailable" },
        migrations_applied: applied,
        migrations_total: total,
    })
}

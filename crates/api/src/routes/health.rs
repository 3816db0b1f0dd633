use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use minutes_core::types::Timestamp;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub success: bool,
    /// `ok` or `degraded`.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the primary database is reachable.
    pub db_healthy: bool,
    pub timestamp: Timestamp,
}

/// Per-dependency status for `/health/detailed`.
#[derive(Serialize)]
pub struct DependencyStatus {
    pub database: bool,
    pub directory: bool,
    pub uploads_writable: bool,
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    pub success: bool,
    pub status: &'static str,
    pub version: &'static str,
    pub checks: DependencyStatus,
    pub timestamp: Timestamp,
}

fn status_of(healthy: bool) -> (StatusCode, &'static str) {
    if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    }
}

/// GET /api/health -- service and primary database health.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = minutes_db::health_check(&state.pool).await.is_ok();
    let (code, status) = status_of(db_healthy);

    (
        code,
        Json(HealthResponse {
            success: db_healthy,
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            timestamp: Utc::now(),
        }),
    )
}

/// GET /api/health/detailed -- every dependency, checked concurrently.
///
/// The personnel directory only affects login, so its outage is reported
/// without failing the check.
async fn detailed_health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<DetailedHealthResponse>) {
    let (database, directory, uploads_writable) = tokio::join!(
        minutes_db::health_check(&state.pool),
        state.directory.ping(),
        state.uploads.is_writable(),
    );
    let checks = DependencyStatus {
        database: database.is_ok(),
        directory: directory.is_ok(),
        uploads_writable,
    };
    let healthy = checks.database && checks.uploads_writable;
    let (code, status) = status_of(healthy);

    (
        code,
        Json(DetailedHealthResponse {
            success: healthy,
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
            timestamp: Utc::now(),
        }),
    )
}

/// Health routes, mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
}

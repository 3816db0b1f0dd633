//! Route definitions for the `/management` console.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::management;
use crate::state::AppState;

/// Routes mounted at `/management`. Every route requires the secretary role.
///
/// ```text
/// GET    /statistics              -> statistics
/// GET    /storage-breakdown       -> storage_breakdown
/// GET    /recent-activities       -> recent_activities (?limit=)
/// GET    /meetings                -> meetings
/// POST   /meetings/bulk-delete    -> bulk_delete_meetings
/// GET    /agendas                 -> agendas
/// POST   /agendas/bulk-delete     -> bulk_delete_agendas
/// GET    /files                   -> files
/// DELETE /files/{kind}/{id}       -> delete_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/statistics", get(management::statistics))
        .route("/storage-breakdown", get(management::storage_breakdown))
        .route("/recent-activities", get(management::recent_activities))
        .route("/meetings", get(management::meetings))
        .route("/meetings/bulk-delete", post(management::bulk_delete_meetings))
        .route("/agendas", get(management::agendas))
        .route("/agendas/bulk-delete", post(management::bulk_delete_agendas))
        .route("/files", get(management::files))
        .route("/files/{kind}/{id}", delete(management::delete_file))
}

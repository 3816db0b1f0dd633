//! Route definitions for the `/meetings` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::meetings;
use crate::state::AppState;

/// Routes mounted at `/meetings`.
///
/// ```text
/// GET    /                    -> list_meetings (?search=)
/// POST   /                    -> create_meeting
/// GET    /with-stats          -> list_with_stats
/// GET    /with-reports        -> list_with_reports
/// GET    /without-reports     -> list_without_reports
/// GET    /{id}                -> get_meeting
/// PUT    /{id}                -> update_meeting
/// DELETE /{id}                -> delete_meeting
/// PUT    /{id}/report         -> upload_report (multipart `pdfFile`)
/// GET    /{id}/files          -> list_meeting_files
/// POST   /{id}/files          -> upload_meeting_files (multipart `files`)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(meetings::list_meetings).post(meetings::create_meeting),
        )
        .route("/with-stats", get(meetings::list_with_stats))
        .route("/with-reports", get(meetings::list_with_reports))
        .route("/without-reports", get(meetings::list_without_reports))
        .route(
            "/{id}",
            get(meetings::get_meeting)
                .put(meetings::update_meeting)
                .delete(meetings::delete_meeting),
        )
        .route("/{id}/report", put(meetings::upload_report))
        .route(
            "/{id}/files",
            get(meetings::list_meeting_files).post(meetings::upload_meeting_files),
        )
}

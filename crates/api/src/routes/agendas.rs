//! Route definitions for the `/agendas` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::agendas;
use crate::state::AppState;

/// Routes mounted at `/agendas`.
///
/// ```text
/// GET    /                          -> list_agendas (?meeting_number=&department=&type=)
/// POST   /                          -> create_agenda
/// POST   /with-files                -> create_agenda_with_files (multipart)
/// GET    /{id}                      -> get_agenda
/// PUT    /{id}                      -> update_agenda
/// DELETE /{id}                      -> delete_agenda (soft)
/// PUT    /{id}/with-files           -> update_agenda_with_files (multipart)
/// GET    /{id}/files                -> list_agenda_files
/// DELETE /{id}/files/{file_id}      -> delete_agenda_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(agendas::list_agendas).post(agendas::create_agenda))
        .route("/with-files", post(agendas::create_agenda_with_files))
        .route(
            "/{id}",
            get(agendas::get_agenda)
                .put(agendas::update_agenda)
                .delete(agendas::delete_agenda),
        )
        .route("/{id}/with-files", put(agendas::update_agenda_with_files))
        .route("/{id}/files", get(agendas::list_agenda_files))
        .route("/{id}/files/{file_id}", delete(agendas::delete_agenda_file))
}

pub mod agendas;
pub mod auth;
pub mod health;
pub mod management;
pub mod meetings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                  service + database health (public)
/// /health/detailed                         database, directory, uploads (public)
///
/// /auth/login                              login (public)
/// /auth/logout                             logout (public, audited with a token)
/// /auth/verify                             current identity
///
/// /meetings                                list, create (secretary)
/// /meetings/with-stats                     list with agenda counts
/// /meetings/with-reports                   meetings with a report document
/// /meetings/without-reports                meetings still pending a report
/// /meetings/{id}                           get, update, delete (secretary)
/// /meetings/{id}/report                    upload report document (secretary)
/// /meetings/{id}/files                     list, upload attachments (secretary)
///
/// /agendas                                 list, create (secretary or manager)
/// /agendas/with-files                      create with attachments
/// /agendas/{id}                            get, update, soft delete
/// /agendas/{id}/with-files                 update, add and remove attachments
/// /agendas/{id}/files                      list attachments
/// /agendas/{id}/files/{file_id}            delete attachment (uploader or secretary)
///
/// /management/statistics                   system counters (secretary only)
/// /management/storage-breakdown            bytes per storage category
/// /management/recent-activities            latest audit entries
/// /management/meetings                     meetings with agenda counts
/// /management/meetings/bulk-delete         hard delete many meetings
/// /management/agendas                      agenda items with meeting info
/// /management/agendas/bulk-delete          soft delete many agenda items
/// /management/files                        every stored file
/// /management/files/{kind}/{id}            delete one stored file
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/meetings", meetings::router())
        .nest("/agendas", agendas::router())
        .nest("/management", management::router())
}

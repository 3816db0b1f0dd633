//! Handlers for the `/agendas` resource.
//!
//! Agenda items are maintained by secretaries and managers. Deleting an item
//! is a soft delete that also hides its attachments; removing a single
//! attachment is permanent and allowed to its uploader or a secretary.

use std::collections::HashMap;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use minutes_core::audit::{actions, resources};
use minutes_core::error::CoreError;
use minutes_core::messages;
use minutes_core::roles::{AccessRule, Role};
use minutes_core::types::DbId;
use minutes_core::uploads::MAX_AGENDA_FILES;
use minutes_core::validation::validate_required;
use minutes_db::models::agenda::{
    Agenda, AgendaFilter, AgendaWithFiles, CreateAgenda, UpdateAgenda,
};
use minutes_db::models::attached_file::{AttachedFile, AttachmentOwner};
use minutes_db::repositories::{AgendaRepo, AttachedFileRepo};
use serde_json::json;

use crate::audit::AuditEvent;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery, RequestOrigin};
use crate::middleware::rbac::{ensure_access, RequireAuth, RequireEditor};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::UploadForm;

/// Multipart field carrying attachments.
const FILES_FIELD: &str = "files";
/// Multipart field listing attachment ids to remove on update.
const DELETE_FILE_IDS_FIELD: &str = "deleteFileIds";

fn agenda_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "agenda",
        id,
    })
}

async fn find_agenda(state: &AppState, id: DbId) -> AppResult<Agenda> {
    AgendaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| agenda_not_found(id))
}

/// Attach each agenda's files, preserving the agenda order.
async fn with_files(state: &AppState, agendas: Vec<Agenda>) -> AppResult<Vec<AgendaWithFiles>> {
    let ids: Vec<DbId> = agendas.iter().map(|a| a.id).collect();
    let mut grouped: HashMap<DbId, Vec<AttachedFile>> = HashMap::new();
    for file in AttachedFileRepo::list_for_agendas(&state.pool, &ids).await? {
        if let Some(agenda_id) = file.agenda_id {
            grouped.entry(agenda_id).or_default().push(file);
        }
    }

    Ok(agendas
        .into_iter()
        .map(|agenda| AgendaWithFiles {
            files: grouped.remove(&agenda.id).unwrap_or_default(),
            agenda,
        })
        .collect())
}

/// Build the create payload from multipart text fields.
fn create_from_form(form: &mut UploadForm) -> CreateAgenda {
    CreateAgenda {
        meeting_number: form.take("meeting_number"),
        agenda_number: form.take("agenda_number"),
        agenda_topic: form.take("agenda_topic"),
        agenda_type: form.take("agenda_type"),
        submitting_department: form.take("submitting_department"),
        description: form.take("description"),
    }
}

/// Build the partial-update payload from multipart text fields.
fn update_from_form(form: &mut UploadForm) -> UpdateAgenda {
    UpdateAgenda {
        meeting_number: form.take("meeting_number"),
        agenda_number: form.take("agenda_number"),
        agenda_topic: form.take("agenda_topic"),
        agenda_type: form.take("agenda_type"),
        submitting_department: form.take("submitting_department"),
        description: form.take("description"),
    }
}

/// Parse `deleteFileIds`, sent either as a JSON array (`[3,4]`) or as a
/// comma-separated list (`3,4`). Blank means none.
fn parse_file_ids(raw: Option<&str>) -> Result<Vec<DbId>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Vec::new());
    };

    let invalid = || AppError::BadRequest(messages::INVALID_REQUEST_BODY.to_string());
    if raw.starts_with('[') {
        return serde_json::from_str::<Vec<DbId>>(raw).map_err(|_| invalid());
    }
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<DbId>().map_err(|_| invalid()))
        .collect()
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/agendas?meeting_number=&department=&type=
pub async fn list_agendas(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    origin: RequestOrigin,
    ApiQuery(filter): ApiQuery<AgendaFilter>,
) -> AppResult<Json<DataResponse<Vec<AgendaWithFiles>>>> {
    let agendas = AgendaRepo::list(&state.pool, &filter).await?;
    let agendas = with_files(&state, agendas).await?;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::VIEW).resource(resources::AGENDA, None),
            &origin,
        )
        .await;

    Ok(Json(DataResponse::list(agendas)))
}

/// GET /api/agendas/{id}
pub async fn get_agenda(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<AgendaWithFiles>>> {
    let agenda = find_agenda(&state, id).await?;
    let files = AttachedFileRepo::list_for(&state.pool, AttachmentOwner::Agenda(id)).await?;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::VIEW).resource(resources::AGENDA, Some(id)),
            &origin,
        )
        .await;

    Ok(Json(DataResponse::new(AgendaWithFiles { agenda, files })))
}

/// GET /api/agendas/{id}/files
pub async fn list_agenda_files(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<Vec<AttachedFile>>>> {
    find_agenda(&state, id).await?;
    let files = AttachedFileRepo::list_for(&state.pool, AttachmentOwner::Agenda(id)).await?;
    Ok(Json(DataResponse::list(files)))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/agendas
pub async fn create_agenda(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    origin: RequestOrigin,
    ApiJson(input): ApiJson<CreateAgenda>,
) -> AppResult<(StatusCode, Json<DataResponse<AgendaWithFiles>>)> {
    validate_required(&input)?;
    let agenda = AgendaRepo::create(&state.pool, &input, &user.username).await?;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::CREATE_AGENDA)
                .resource(resources::AGENDA, Some(agenda.id))
                .detail(json!({
                    "meeting_number": agenda.meeting_number,
                    "agenda_number": agenda.agenda_number,
                })),
            &origin,
        )
        .await;

    tracing::info!(agenda_id = agenda.id, username = %user.username, "Agenda created");

    Ok((
        StatusCode::CREATED,
        Json(
            DataResponse::new(AgendaWithFiles {
                agenda,
                files: Vec::new(),
            })
            .with_message(messages::AGENDA_CREATED),
        ),
    ))
}

/// POST /api/agendas/with-files
///
/// Multipart: the agenda fields as text parts plus up to five `files`.
pub async fn create_agenda_with_files(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    origin: RequestOrigin,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<AgendaWithFiles>>)> {
    let mut form = state
        .uploads
        .read_form(&mut multipart, FILES_FIELD, MAX_AGENDA_FILES)
        .await?;

    let input = create_from_form(&mut form);
    let staged = form.files;
    if let Err(err) = validate_required(&input) {
        staged.discard().await;
        return Err(err.into());
    }

    let agenda = match AgendaRepo::create(&state.pool, &input, &user.username).await {
        Ok(agenda) => agenda,
        Err(err) => {
            staged.discard().await;
            return Err(err.into());
        }
    };

    let attachments = staged.attachments();
    let inserted = AttachedFileRepo::insert_many(
        &state.pool,
        AttachmentOwner::Agenda(agenda.id),
        &attachments,
        &user.username,
    )
    .await;
    let files = match staged.settle(inserted).await {
        Ok(files) => files,
        Err(err) => {
            // The item must not survive without the files it was created with.
            if let Err(rollback) = AgendaRepo::soft_delete(&state.pool, agenda.id).await {
                tracing::error!(
                    agenda_id = agenda.id,
                    error = %rollback,
                    "Failed to withdraw agenda after attachment failure"
                );
            }
            return Err(err.into());
        }
    };

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::CREATE_AGENDA)
                .resource(resources::AGENDA, Some(agenda.id))
                .detail(json!({
                    "meeting_number": agenda.meeting_number,
                    "agenda_number": agenda.agenda_number,
                    "files_count": files.len(),
                })),
            &origin,
        )
        .await;

    tracing::info!(
        agenda_id = agenda.id,
        files = files.len(),
        username = %user.username,
        "Agenda created with files"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(AgendaWithFiles { agenda, files }).with_message(messages::AGENDA_CREATED)),
    ))
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// PUT /api/agendas/{id}
pub async fn update_agenda(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateAgenda>,
) -> AppResult<Json<DataResponse<AgendaWithFiles>>> {
    validate_required(&input)?;
    let agenda = AgendaRepo::update(&state.pool, id, &input, &user.username)
        .await?
        .ok_or_else(|| agenda_not_found(id))?;
    let files = AttachedFileRepo::list_for(&state.pool, AttachmentOwner::Agenda(id)).await?;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::UPDATE_AGENDA)
                .resource(resources::AGENDA, Some(id))
                .detail(json!({ "agenda_number": agenda.agenda_number })),
            &origin,
        )
        .await;

    Ok(Json(
        DataResponse::new(AgendaWithFiles { agenda, files }).with_message(messages::AGENDA_UPDATED),
    ))
}

/// PUT /api/agendas/{id}/with-files
///
/// Multipart: any agenda fields to change, `deleteFileIds` naming
/// attachments to remove, and up to five new `files`.
pub async fn update_agenda_with_files(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<AgendaWithFiles>>> {
    find_agenda(&state, id).await?;

    let mut form = state
        .uploads
        .read_form(&mut multipart, FILES_FIELD, MAX_AGENDA_FILES)
        .await?;

    let delete_ids = parse_file_ids(form.fields.get(DELETE_FILE_IDS_FIELD).map(String::as_str));
    let input = update_from_form(&mut form);
    let staged = form.files;

    let delete_ids = match delete_ids.and_then(|ids| {
        validate_required(&input)?;
        Ok(ids)
    }) {
        Ok(ids) => ids,
        Err(err) => {
            staged.discard().await;
            return Err(err);
        }
    };

    let agenda = match AgendaRepo::update(&state.pool, id, &input, &user.username).await {
        Ok(Some(agenda)) => agenda,
        Ok(None) => {
            staged.discard().await;
            return Err(agenda_not_found(id));
        }
        Err(err) => {
            staged.discard().await;
            return Err(err.into());
        }
    };

    let removed = match AttachedFileRepo::delete_for_agenda(&state.pool, id, &delete_ids).await {
        Ok(removed) => removed,
        Err(err) => {
            staged.discard().await;
            return Err(err.into());
        }
    };
    let removed_paths: Vec<&str> = removed.iter().map(|f| f.file_path.as_str()).collect();
    state.uploads.remove_all(&removed_paths).await;

    let attachments = staged.attachments();
    let inserted = AttachedFileRepo::insert_many(
        &state.pool,
        AttachmentOwner::Agenda(id),
        &attachments,
        &user.username,
    )
    .await;
    let added = staged.settle(inserted).await?;

    let files = AttachedFileRepo::list_for(&state.pool, AttachmentOwner::Agenda(id)).await?;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::UPDATE_AGENDA)
                .resource(resources::AGENDA, Some(id))
                .detail(json!({
                    "agenda_number": agenda.agenda_number,
                    "files_deleted": removed.len(),
                    "files_added": added.len(),
                })),
            &origin,
        )
        .await;

    Ok(Json(
        DataResponse::new(AgendaWithFiles { agenda, files }).with_message(messages::AGENDA_UPDATED),
    ))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// DELETE /api/agendas/{id}
///
/// Soft delete: the item and its attachments are marked inactive and stop
/// appearing in listings. Stored bytes are kept.
pub async fn delete_agenda(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<Agenda>>> {
    let agenda = AgendaRepo::soft_delete(&state.pool, id)
        .await?
        .ok_or_else(|| agenda_not_found(id))?;
    let files_hidden = AttachedFileRepo::soft_delete_for_agendas(&state.pool, &[id]).await?;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::DELETE_AGENDA)
                .resource(resources::AGENDA, Some(id))
                .detail(json!({
                    "agenda_number": agenda.agenda_number,
                    "files_hidden": files_hidden,
                })),
            &origin,
        )
        .await;

    Ok(Json(DataResponse::new(agenda).with_message(messages::AGENDA_DELETED)))
}

/// DELETE /api/agendas/{id}/files/{file_id}
///
/// Permanently remove one attachment. Allowed to the user who uploaded it
/// and to secretaries.
pub async fn delete_agenda_file(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    origin: RequestOrigin,
    ApiPath((id, file_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<AttachedFile>>> {
    find_agenda(&state, id).await?;

    let file_not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "file",
            id: file_id,
        })
    };
    let file = AttachedFileRepo::find_by_id(&state.pool, file_id)
        .await?
        .filter(|f| f.agenda_id == Some(id) && f.is_active)
        .ok_or_else(file_not_found)?;

    ensure_access(
        &user,
        AccessRule::OwnerOr {
            owner: Some(file.uploaded_by.as_str()),
            role: Role::Secretary,
        },
        messages::NOT_RESOURCE_OWNER,
    )?;

    let file = AttachedFileRepo::delete(&state.pool, file_id)
        .await?
        .ok_or_else(file_not_found)?;
    state.uploads.remove(&file.file_path).await;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::DELETE_FILE)
                .resource(resources::AGENDA_FILE, Some(file_id))
                .detail(json!({
                    "agenda_id": id,
                    "file_name": file.file_name,
                })),
            &origin,
        )
        .await;

    Ok(Json(DataResponse::new(file).with_message(messages::FILE_DELETED)))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn file_ids_accept_json_array() {
        assert_eq!(parse_file_ids(Some("[3, 4]")).unwrap(), vec![3, 4]);
    }

    #[test]
    fn file_ids_accept_comma_list() {
        assert_eq!(parse_file_ids(Some("3, 4,5")).unwrap(), vec![3, 4, 5]);
    }

    #[test]
    fn blank_file_ids_mean_none() {
        assert!(parse_file_ids(None).unwrap().is_empty());
        assert!(parse_file_ids(Some("  ")).unwrap().is_empty());
        assert!(parse_file_ids(Some("[]")).unwrap().is_empty());
    }

    #[test]
    fn malformed_file_ids_are_rejected() {
        assert_matches!(parse_file_ids(Some("3,x")), Err(AppError::BadRequest(_)));
        assert_matches!(parse_file_ids(Some("[3,")), Err(AppError::BadRequest(_)));
    }
}

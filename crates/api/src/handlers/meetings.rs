//! Handlers for the `/meetings` resource.
//!
//! Reads are open to any authenticated user; every mutation requires the
//! secretary role. A meeting's report document is a single file stored on
//! the meeting row; additional files are attachments.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use minutes_core::audit::{actions, resources};
use minutes_core::error::CoreError;
use minutes_core::format::{format_file_size, thai_date};
use minutes_core::messages;
use minutes_core::types::DbId;
use minutes_core::uploads::{UploadError, MAX_MEETING_FILES};
use minutes_core::validation::validate_required;
use minutes_db::models::attached_file::{AttachedFile, AttachmentOwner};
use minutes_db::models::meeting::{
    CreateMeeting, Meeting, MeetingFilter, MeetingWithStats, UpdateMeeting,
};
use minutes_db::repositories::{AttachedFileRepo, MeetingRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::audit::AuditEvent;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery, RequestOrigin};
use crate::middleware::rbac::{RequireAuth, RequireSecretary};
use crate::response::{DataResponse, UploadResponse};
use crate::state::AppState;

/// Multipart field carrying a report document.
const REPORT_FIELD: &str = "pdfFile";
/// Multipart field carrying attachments.
const FILES_FIELD: &str = "files";

// ---------------------------------------------------------------------------
// Representations
// ---------------------------------------------------------------------------

/// A meeting with the display fields the client renders directly.
#[derive(Debug, Serialize)]
pub struct MeetingView {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub meeting_date_thai: String,
    pub file_size_formatted: String,
    pub has_report: bool,
}

impl From<Meeting> for MeetingView {
    fn from(meeting: Meeting) -> Self {
        Self {
            meeting_date_thai: thai_date(meeting.meeting_date),
            file_size_formatted: format_file_size(meeting.file_size),
            has_report: meeting.has_report(),
            meeting,
        }
    }
}

/// [`MeetingView`] plus the number of active agenda items.
#[derive(Debug, Serialize)]
pub struct MeetingStatsView {
    #[serde(flatten)]
    pub meeting: MeetingView,
    pub agenda_count: i64,
}

impl From<MeetingWithStats> for MeetingStatsView {
    fn from(row: MeetingWithStats) -> Self {
        Self {
            meeting: MeetingView::from(row.meeting),
            agenda_count: row.agenda_count,
        }
    }
}

/// Query string for `GET /meetings`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

async fn find_meeting(state: &AppState, id: DbId) -> AppResult<Meeting> {
    MeetingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "meeting",
            id,
        }))
}

async fn ensure_number_free(state: &AppState, number: &str, except: Option<DbId>) -> AppResult<()> {
    if MeetingRepo::number_taken(&state.pool, number, except).await? {
        return Err(AppError::Core(CoreError::Conflict(
            messages::MEETING_NUMBER_TAKEN.into(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/meetings?search=
pub async fn list_meetings(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    origin: RequestOrigin,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> AppResult<Json<DataResponse<Vec<MeetingView>>>> {
    let filter = MeetingFilter {
        search: query.search,
        ..Default::default()
    };
    let meetings = MeetingRepo::list(&state.pool, &filter).await?;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::VIEW).resource(resources::MEETING, None),
            &origin,
        )
        .await;

    Ok(Json(DataResponse::list(
        meetings.into_iter().map(MeetingView::from).collect(),
    )))
}

/// GET /api/meetings/with-stats
pub async fn list_with_stats(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiQuery(filter): ApiQuery<MeetingFilter>,
) -> AppResult<Json<DataResponse<Vec<MeetingStatsView>>>> {
    let rows = MeetingRepo::list_with_stats(&state.pool, &filter).await?;
    Ok(Json(DataResponse::list(
        rows.into_iter().map(MeetingStatsView::from).collect(),
    )))
}

/// GET /api/meetings/with-reports
pub async fn list_with_reports(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    origin: RequestOrigin,
) -> AppResult<Json<DataResponse<Vec<MeetingView>>>> {
    let filter = MeetingFilter {
        has_report: Some(true),
        ..Default::default()
    };
    let meetings = MeetingRepo::list(&state.pool, &filter).await?;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::VIEW).resource(resources::MEETING_REPORT, None),
            &origin,
        )
        .await;

    Ok(Json(DataResponse::list(
        meetings.into_iter().map(MeetingView::from).collect(),
    )))
}

/// GET /api/meetings/without-reports
pub async fn list_without_reports(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<MeetingView>>>> {
    let filter = MeetingFilter {
        has_report: Some(false),
        ..Default::default()
    };
    let meetings = MeetingRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse::list(
        meetings.into_iter().map(MeetingView::from).collect(),
    )))
}

/// GET /api/meetings/{id}
pub async fn get_meeting(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<MeetingView>>> {
    let meeting = find_meeting(&state, id).await?;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::VIEW).resource(resources::MEETING, Some(id)),
            &origin,
        )
        .await;

    Ok(Json(DataResponse::new(MeetingView::from(meeting))))
}

/// GET /api/meetings/{id}/files
pub async fn list_meeting_files(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<Vec<AttachedFile>>>> {
    find_meeting(&state, id).await?;
    let files = AttachedFileRepo::list_for(&state.pool, AttachmentOwner::Meeting(id)).await?;
    Ok(Json(DataResponse::list(files)))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/meetings
///
/// Create a meeting without a report document.
pub async fn create_meeting(
    State(state): State<AppState>,
    RequireSecretary(user): RequireSecretary,
    origin: RequestOrigin,
    ApiJson(input): ApiJson<CreateMeeting>,
) -> AppResult<(StatusCode, Json<DataResponse<MeetingView>>)> {
    validate_required(&input)?;
    if let Some(number) = input.meeting_number.as_deref() {
        ensure_number_free(&state, number, None).await?;
    }

    let meeting = MeetingRepo::create(&state.pool, &input, &user.username).await?;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::CREATE_MEETING)
                .resource(resources::MEETING, Some(meeting.id))
                .detail(json!({ "meeting_number": meeting.meeting_number })),
            &origin,
        )
        .await;

    tracing::info!(meeting_id = meeting.id, username = %user.username, "Meeting created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(MeetingView::from(meeting)).with_message(messages::MEETING_CREATED)),
    ))
}

/// PUT /api/meetings/{id}
///
/// Partial update: omitted fields keep their stored values.
pub async fn update_meeting(
    State(state): State<AppState>,
    RequireSecretary(user): RequireSecretary,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateMeeting>,
) -> AppResult<Json<DataResponse<MeetingView>>> {
    validate_required(&input)?;
    if let Some(number) = input.meeting_number.as_deref() {
        ensure_number_free(&state, number, Some(id)).await?;
    }

    let meeting = MeetingRepo::update(&state.pool, id, &input, &user.username)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "meeting",
            id,
        }))?;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::UPDATE_MEETING)
                .resource(resources::MEETING, Some(id))
                .detail(json!({ "meeting_number": meeting.meeting_number })),
            &origin,
        )
        .await;

    Ok(Json(
        DataResponse::new(MeetingView::from(meeting)).with_message(messages::MEETING_UPDATED),
    ))
}

/// DELETE /api/meetings/{id}
///
/// Hard delete. Attachment rows go with the meeting; the report document
/// and attachment bytes are then removed from disk.
pub async fn delete_meeting(
    State(state): State<AppState>,
    RequireSecretary(user): RequireSecretary,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<MeetingView>>> {
    let attachment_paths = AttachedFileRepo::paths_for_meetings(&state.pool, &[id]).await?;

    let meeting = MeetingRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "meeting",
            id,
        }))?;

    state.uploads.remove(&meeting.file_path).await;
    state.uploads.remove_all(&attachment_paths).await;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::DELETE_MEETING)
                .resource(resources::MEETING, Some(id))
                .detail(json!({
                    "meeting_number": meeting.meeting_number,
                    "files_removed": attachment_paths.len(),
                })),
            &origin,
        )
        .await;

    tracing::info!(meeting_id = id, username = %user.username, "Meeting deleted");

    Ok(Json(
        DataResponse::new(MeetingView::from(meeting)).with_message(messages::MEETING_DELETED),
    ))
}

/// PUT /api/meetings/{id}/report
///
/// Multipart with a single `pdfFile` part. Replaces any previous report
/// document, whose bytes are removed once the new one is recorded.
pub async fn upload_report(
    State(state): State<AppState>,
    RequireSecretary(user): RequireSecretary,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<MeetingView>>> {
    let previous = find_meeting(&state, id).await?;

    let form = state
        .uploads
        .read_form(&mut multipart, REPORT_FIELD, 1)
        .await?;

    let Some(report) = form.files.files().first().cloned() else {
        return Err(UploadError::NoFile.into());
    };
    if report.size == 0 {
        form.files.discard().await;
        return Err(UploadError::NoFile.into());
    }

    let size = i64::try_from(report.size).unwrap_or(i64::MAX);
    let result = MeetingRepo::set_report(&state.pool, id, &report.public_path, size, &user.username)
        .await
        .map_err(AppError::from)
        .and_then(|row| {
            row.ok_or(AppError::Core(CoreError::NotFound {
                entity: "meeting",
                id,
            }))
        });
    let meeting = form.files.settle(result).await?;

    if previous.file_path != meeting.file_path {
        state.uploads.remove(&previous.file_path).await;
    }

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::UPLOAD_REPORT)
                .resource(resources::MEETING, Some(id))
                .detail(json!({
                    "meeting_number": meeting.meeting_number,
                    "file_name": report.original_name,
                    "file_size": report.size,
                })),
            &origin,
        )
        .await;

    Ok(Json(
        DataResponse::new(MeetingView::from(meeting)).with_message(messages::REPORT_UPLOADED),
    ))
}

/// POST /api/meetings/{id}/files
///
/// Multipart with up to ten `files` parts, stored as meeting attachments.
pub async fn upload_meeting_files(
    State(state): State<AppState>,
    RequireSecretary(user): RequireSecretary,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse<Vec<AttachedFile>>>)> {
    let meeting = find_meeting(&state, id).await?;

    let form = state
        .uploads
        .read_form(&mut multipart, FILES_FIELD, MAX_MEETING_FILES)
        .await?;
    if form.files.is_empty() {
        return Err(UploadError::NoFile.into());
    }

    let attachments = form.files.attachments();
    let result = AttachedFileRepo::insert_many(
        &state.pool,
        AttachmentOwner::Meeting(id),
        &attachments,
        &user.username,
    )
    .await;
    let inserted = form.files.settle(result).await?;

    let file_names: Vec<&str> = inserted.iter().map(|f| f.file_name.as_str()).collect();
    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::UPLOAD_MEETING_FILES)
                .resource(resources::MEETING, Some(id))
                .detail(json!({
                    "meeting_number": meeting.meeting_number,
                    "files_count": inserted.len(),
                    "file_names": file_names,
                })),
            &origin,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            message: messages::FILES_UPLOADED,
            files_uploaded: inserted.len(),
            data: inserted,
        }),
    ))
}

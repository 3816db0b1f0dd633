//! Handlers for the `/management` console. Secretary only.

use std::fmt;
use std::str::FromStr;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use minutes_core::audit::{actions, describe_action, resources, time_ago};
use minutes_core::error::CoreError;
use minutes_core::format::format_file_size;
use minutes_core::messages;
use minutes_core::types::{DbId, Timestamp};
use minutes_core::validation::require_ids;
use minutes_db::models::agenda::{AgendaFilter, AgendaWithMeeting};
use minutes_db::models::attached_file::StoredFileEntry;
use minutes_db::models::audit::AuditLog;
use minutes_db::models::meeting::MeetingFilter;
use minutes_db::models::stats::StorageUsage;
use minutes_db::repositories::{
    AgendaRepo, AttachedFileRepo, AuditLogRepo, MeetingRepo, StatsRepo,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::audit::AuditEvent;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery, RequestOrigin};
use crate::handlers::meetings::MeetingStatsView;
use crate::middleware::rbac::RequireSecretary;
use crate::response::{BulkDeleteResponse, DataResponse};
use crate::state::AppState;

const DEFAULT_RECENT_LIMIT: i64 = 10;

// ---------------------------------------------------------------------------
// Representations
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SystemStatistics {
    pub meetings_total: i64,
    pub agendas_total: i64,
    pub reports_uploaded: i64,
    pub reports_pending: i64,
    pub files_total: i64,
    pub storage_used_bytes: i64,
    pub storage_used_formatted: String,
    pub timestamp: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct StorageCategory {
    pub count: i64,
    pub size_bytes: i64,
    pub size_formatted: String,
}

impl From<StorageUsage> for StorageCategory {
    fn from(usage: StorageUsage) -> Self {
        Self {
            count: usage.count,
            size_bytes: usage.size_bytes,
            size_formatted: format_file_size(usage.size_bytes),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StorageBreakdown {
    pub meeting_reports: StorageCategory,
    pub meeting_files: StorageCategory,
    pub agenda_files: StorageCategory,
    pub total: StorageCategory,
}

/// An audit entry with a readable description and relative age.
#[derive(Debug, Serialize)]
pub struct ActivityView {
    #[serde(flatten)]
    pub log: AuditLog,
    pub description: String,
    pub time_ago: String,
}

impl ActivityView {
    fn at(log: AuditLog, now: Timestamp) -> Self {
        Self {
            description: describe_action(&log.action).to_string(),
            time_ago: time_ago(now - log.created_at),
            log,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoredFileView {
    #[serde(flatten)]
    pub entry: StoredFileEntry,
    pub file_size_formatted: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// Body of the bulk delete endpoints.
#[derive(Debug, Deserialize)]
pub struct IdsRequest {
    pub ids: Option<Vec<DbId>>,
}

/// The three places a stored file can be referenced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    MeetingReport,
    MeetingFile,
    AgendaFile,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::MeetingReport => resources::MEETING_REPORT,
            FileKind::MeetingFile => resources::MEETING_FILE,
            FileKind::AgendaFile => resources::AGENDA_FILE,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meeting_report" => Ok(FileKind::MeetingReport),
            "meeting_file" => Ok(FileKind::MeetingFile),
            "agenda_file" => Ok(FileKind::AgendaFile),
            _ => Err(CoreError::Validation(messages::INVALID_FILE_KIND.into())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedFile {
    pub kind: FileKind,
    pub id: DbId,
    pub file_path: String,
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// GET /api/management/statistics
pub async fn statistics(
    State(state): State<AppState>,
    RequireSecretary(user): RequireSecretary,
    origin: RequestOrigin,
) -> AppResult<Json<DataResponse<SystemStatistics>>> {
    let counts = StatsRepo::system_counts(&state.pool).await?;
    let storage_used_bytes = counts.report_bytes + counts.attachment_bytes;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::VIEW_STATISTICS).resource(resources::MANAGEMENT, None),
            &origin,
        )
        .await;

    Ok(Json(DataResponse::new(SystemStatistics {
        meetings_total: counts.meetings_total,
        agendas_total: counts.agendas_total,
        reports_uploaded: counts.reports_uploaded,
        reports_pending: (counts.meetings_total - counts.reports_uploaded).max(0),
        files_total: counts.reports_uploaded + counts.attachments_total,
        storage_used_bytes,
        storage_used_formatted: format_file_size(storage_used_bytes),
        timestamp: Utc::now(),
    })))
}

/// GET /api/management/storage-breakdown
pub async fn storage_breakdown(
    State(state): State<AppState>,
    RequireSecretary(_user): RequireSecretary,
) -> AppResult<Json<DataResponse<StorageBreakdown>>> {
    let reports = StatsRepo::report_usage(&state.pool).await?;
    let meeting_files = StatsRepo::meeting_attachment_usage(&state.pool).await?;
    let agenda_files = StatsRepo::agenda_attachment_usage(&state.pool).await?;

    let total = StorageUsage {
        count: reports.count + meeting_files.count + agenda_files.count,
        size_bytes: reports.size_bytes + meeting_files.size_bytes + agenda_files.size_bytes,
    };

    Ok(Json(DataResponse::new(StorageBreakdown {
        meeting_reports: reports.into(),
        meeting_files: meeting_files.into(),
        agenda_files: agenda_files.into(),
        total: total.into(),
    })))
}

/// GET /api/management/recent-activities?limit=
pub async fn recent_activities(
    State(state): State<AppState>,
    RequireSecretary(_user): RequireSecretary,
    ApiQuery(query): ApiQuery<RecentQuery>,
) -> AppResult<Json<DataResponse<Vec<ActivityView>>>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let logs = AuditLogRepo::recent(&state.pool, limit).await?;
    let now = Utc::now();
    Ok(Json(DataResponse::list(
        logs.into_iter().map(|log| ActivityView::at(log, now)).collect(),
    )))
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// GET /api/management/meetings?search=&department=&has_report=
pub async fn meetings(
    State(state): State<AppState>,
    RequireSecretary(_user): RequireSecretary,
    ApiQuery(filter): ApiQuery<MeetingFilter>,
) -> AppResult<Json<DataResponse<Vec<MeetingStatsView>>>> {
    let rows = MeetingRepo::list_with_stats(&state.pool, &filter).await?;
    Ok(Json(DataResponse::list(
        rows.into_iter().map(MeetingStatsView::from).collect(),
    )))
}

/// GET /api/management/agendas?meeting_number=&department=&type=
pub async fn agendas(
    State(state): State<AppState>,
    RequireSecretary(_user): RequireSecretary,
    ApiQuery(filter): ApiQuery<AgendaFilter>,
) -> AppResult<Json<DataResponse<Vec<AgendaWithMeeting>>>> {
    let rows = AgendaRepo::list_with_meeting(&state.pool, &filter).await?;
    Ok(Json(DataResponse::list(rows)))
}

/// GET /api/management/files
pub async fn files(
    State(state): State<AppState>,
    RequireSecretary(_user): RequireSecretary,
) -> AppResult<Json<DataResponse<Vec<StoredFileView>>>> {
    let entries = AttachedFileRepo::list_stored_files(&state.pool).await?;
    Ok(Json(DataResponse::list(
        entries
            .into_iter()
            .map(|entry| StoredFileView {
                file_size_formatted: format_file_size(entry.file_size),
                entry,
            })
            .collect(),
    )))
}

// ---------------------------------------------------------------------------
// Bulk and file deletes
// ---------------------------------------------------------------------------

/// POST /api/management/meetings/bulk-delete
///
/// Hard-deletes every listed meeting with its attachments and stored bytes.
pub async fn bulk_delete_meetings(
    State(state): State<AppState>,
    RequireSecretary(user): RequireSecretary,
    origin: RequestOrigin,
    ApiJson(input): ApiJson<IdsRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let ids = require_ids(input.ids.as_deref())?;

    let attachment_paths = AttachedFileRepo::paths_for_meetings(&state.pool, ids).await?;
    let deleted = MeetingRepo::bulk_delete(&state.pool, ids).await?;

    let report_paths: Vec<&str> = deleted.iter().map(|m| m.file_path.as_str()).collect();
    state.uploads.remove_all(&report_paths).await;
    state.uploads.remove_all(&attachment_paths).await;

    let deleted_ids: Vec<DbId> = deleted.iter().map(|m| m.id).collect();
    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::BULK_DELETE_MEETINGS)
                .resource(resources::MEETING, None)
                .detail(json!({ "count": deleted.len(), "ids": deleted_ids })),
            &origin,
        )
        .await;

    tracing::info!(count = deleted.len(), username = %user.username, "Meetings bulk deleted");

    Ok(Json(BulkDeleteResponse {
        success: true,
        message: messages::meetings_deleted(deleted.len()),
        deleted_count: deleted.len(),
    }))
}

/// POST /api/management/agendas/bulk-delete
///
/// Soft-deletes every listed agenda item and its attachments.
pub async fn bulk_delete_agendas(
    State(state): State<AppState>,
    RequireSecretary(user): RequireSecretary,
    origin: RequestOrigin,
    ApiJson(input): ApiJson<IdsRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let ids = require_ids(input.ids.as_deref())?;

    let deleted = AgendaRepo::bulk_soft_delete(&state.pool, ids).await?;
    let deleted_ids: Vec<DbId> = deleted.iter().map(|a| a.id).collect();
    let files_hidden = AttachedFileRepo::soft_delete_for_agendas(&state.pool, &deleted_ids).await?;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::BULK_DELETE_AGENDAS)
                .resource(resources::AGENDA, None)
                .detail(json!({
                    "count": deleted_ids.len(),
                    "ids": deleted_ids,
                    "files_hidden": files_hidden,
                })),
            &origin,
        )
        .await;

    Ok(Json(BulkDeleteResponse {
        success: true,
        message: messages::agendas_deleted(deleted.len()),
        deleted_count: deleted.len(),
    }))
}

/// DELETE /api/management/files/{kind}/{id}
///
/// `kind` is `meeting_report` (detaches the report, the meeting stays),
/// `meeting_file` or `agenda_file` (the attachment row is deleted).
pub async fn delete_file(
    State(state): State<AppState>,
    RequireSecretary(user): RequireSecretary,
    origin: RequestOrigin,
    ApiPath((kind, id)): ApiPath<(String, DbId)>,
) -> AppResult<Json<DataResponse<DeletedFile>>> {
    let kind: FileKind = kind.parse()?;
    let file_not_found = || AppError::Core(CoreError::NotFound { entity: "file", id });

    let file_path = match kind {
        FileKind::MeetingReport => {
            let meeting = MeetingRepo::find_by_id(&state.pool, id)
                .await?
                .filter(|m| m.has_report())
                .ok_or_else(file_not_found)?;
            MeetingRepo::clear_report(&state.pool, id, &user.username).await?;
            meeting.file_path
        }
        FileKind::MeetingFile | FileKind::AgendaFile => {
            let belongs = |meeting_id: Option<DbId>, agenda_id: Option<DbId>| match kind {
                FileKind::MeetingFile => meeting_id.is_some(),
                _ => agenda_id.is_some(),
            };
            AttachedFileRepo::find_by_id(&state.pool, id)
                .await?
                .filter(|f| belongs(f.meeting_id, f.agenda_id))
                .ok_or_else(file_not_found)?;
            AttachedFileRepo::delete(&state.pool, id)
                .await?
                .ok_or_else(file_not_found)?
                .file_path
        }
    };

    state.uploads.remove(&file_path).await;

    state
        .audit
        .record(
            &user.username,
            AuditEvent::new(actions::DELETE_FILE)
                .resource(kind.as_str(), Some(id))
                .detail(json!({ "file_path": file_path })),
            &origin,
        )
        .await;

    Ok(Json(
        DataResponse::new(DeletedFile {
            kind,
            id,
            file_path,
        })
        .with_message(messages::FILE_DELETED),
    ))
}

//! Attachment model shared by meetings and agenda items.

use minutes_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `attached_files` table. Exactly one of `meeting_id` and
/// `agenda_id` is set.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttachedFile {
    pub id: DbId,
    pub meeting_id: Option<DbId>,
    pub agenda_id: Option<DbId>,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: Option<String>,
    pub uploaded_by: String,
    pub is_active: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// The record an attachment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentOwner {
    Meeting(DbId),
    Agenda(DbId),
}

impl AttachmentOwner {
    pub(crate) fn column(self) -> &'static str {
        match self {
            AttachmentOwner::Meeting(_) => "meeting_id",
            AttachmentOwner::Agenda(_) => "agenda_id",
        }
    }

    pub(crate) fn id(self) -> DbId {
        match self {
            AttachmentOwner::Meeting(id) | AttachmentOwner::Agenda(id) => id,
        }
    }
}

/// Metadata for a file already written to the upload directory.
#[derive(Debug, Clone)]
pub struct NewAttachedFile {
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: Option<String>,
}

/// One row of the management file listing: a meeting report document, a
/// meeting attachment or an agenda attachment.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredFileEntry {
    /// `meeting_report`, `meeting_file` or `agenda_file`.
    pub kind: String,
    pub id: DbId,
    pub meeting_number: Option<String>,
    pub meeting_title: Option<String>,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub uploaded_by: Option<String>,
    pub created_at: Timestamp,
}

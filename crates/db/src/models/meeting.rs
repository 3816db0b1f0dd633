//! Meeting entity model and DTOs.

use chrono::NaiveDate;
use minutes_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `meeting_reports` table.
///
/// `file_path` / `file_size` describe the report document and are `""` / `0`
/// until one is uploaded.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Meeting {
    pub id: DbId,
    pub meeting_number: String,
    pub meeting_title: String,
    pub meeting_date: NaiveDate,
    pub meeting_time: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub file_path: String,
    pub file_size: i64,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Meeting {
    pub fn has_report(&self) -> bool {
        self.file_size > 0
    }
}

/// A meeting joined with its agenda count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MeetingWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meeting: Meeting,
    pub agenda_count: i64,
    pub has_report: bool,
}

/// DTO for creating a meeting. The first three fields are mandatory;
/// they are `Option` so absent and blank values are reported together.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMeeting {
    #[validate(required, length(min = 1))]
    pub meeting_number: Option<String>,
    #[validate(required, length(min = 1))]
    pub meeting_title: Option<String>,
    #[validate(required)]
    pub meeting_date: Option<NaiveDate>,
    pub meeting_time: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
}

/// DTO for updating a meeting. Only supplied fields change; the mandatory
/// text fields may be omitted but not blanked.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMeeting {
    #[validate(length(min = 1))]
    pub meeting_number: Option<String>,
    #[validate(length(min = 1))]
    pub meeting_title: Option<String>,
    pub meeting_date: Option<NaiveDate>,
    pub meeting_time: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
}

/// Filters accepted by meeting list queries. All are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingFilter {
    /// Case-insensitive substring of title, number or location.
    pub search: Option<String>,
    pub department: Option<String>,
    pub has_report: Option<bool>,
}

//! Agenda item entity model and DTOs.

use chrono::NaiveDate;
use minutes_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::attached_file::AttachedFile;

/// A row from the `meeting_agendas` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Agenda {
    pub id: DbId,
    pub meeting_number: String,
    pub agenda_number: String,
    pub agenda_topic: String,
    pub agenda_type: String,
    pub submitting_department: String,
    pub description: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub is_active: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An agenda item together with its active attachments.
#[derive(Debug, Clone, Serialize)]
pub struct AgendaWithFiles {
    #[serde(flatten)]
    pub agenda: Agenda,
    pub files: Vec<AttachedFile>,
}

/// An agenda item joined with the title and date of its meeting, if the
/// meeting still exists.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AgendaWithMeeting {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub agenda: Agenda,
    pub meeting_title: Option<String>,
    pub meeting_date: Option<NaiveDate>,
}

/// DTO for creating an agenda item.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateAgenda {
    #[validate(required, length(min = 1))]
    pub meeting_number: Option<String>,
    #[validate(required, length(min = 1))]
    pub agenda_number: Option<String>,
    #[validate(required, length(min = 1))]
    pub agenda_topic: Option<String>,
    #[validate(required, length(min = 1))]
    pub agenda_type: Option<String>,
    #[validate(required, length(min = 1))]
    pub submitting_department: Option<String>,
    pub description: Option<String>,
}

/// DTO for updating an agenda item. Only supplied fields change; the
/// mandatory text fields may be omitted but not blanked.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAgenda {
    #[validate(length(min = 1))]
    pub meeting_number: Option<String>,
    #[validate(length(min = 1))]
    pub agenda_number: Option<String>,
    #[validate(length(min = 1))]
    pub agenda_topic: Option<String>,
    #[validate(length(min = 1))]
    pub agenda_type: Option<String>,
    #[validate(length(min = 1))]
    pub submitting_department: Option<String>,
    pub description: Option<String>,
}

/// Filters accepted by agenda list queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgendaFilter {
    pub meeting_number: Option<String>,
    pub department: Option<String>,
    #[serde(rename = "type")]
    pub agenda_type: Option<String>,
}

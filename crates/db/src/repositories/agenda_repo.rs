//! Repository for the `meeting_agendas` table.
//!
//! Agenda items are soft-deleted: `is_active = FALSE` plus `deleted_at`.
//! Every read here excludes inactive rows.

use minutes_core::types::DbId;
use sqlx::PgPool;

use crate::models::agenda::{Agenda, AgendaFilter, AgendaWithMeeting, CreateAgenda, UpdateAgenda};

const COLUMNS: &str = "\
    id, meeting_number, agenda_number, agenda_topic, agenda_type, \
    submitting_department, description, created_by, updated_by, is_active, \
    deleted_at, created_at, updated_at";

const A_COLUMNS: &str = "\
    a.id, a.meeting_number, a.agenda_number, a.agenda_topic, a.agenda_type, \
    a.submitting_department, a.description, a.created_by, a.updated_by, a.is_active, \
    a.deleted_at, a.created_at, a.updated_at";

/// Provides CRUD and soft-delete operations for agenda items.
pub struct AgendaRepo;

impl AgendaRepo {
    /// List active agenda items matching `filter`, newest meeting first.
    pub async fn list(pool: &PgPool, filter: &AgendaFilter) -> Result<Vec<Agenda>, sqlx::Error> {
        let (conditions, binds) = build_agenda_filter(filter);
        let query = format!(
            "SELECT {A_COLUMNS} FROM meeting_agendas a WHERE {conditions} \
             ORDER BY a.meeting_number DESC, a.agenda_number, a.id"
        );
        let mut q = sqlx::query_as::<_, Agenda>(&query);
        for value in &binds {
            q = q.bind(value.as_str());
        }
        q.fetch_all(pool).await
    }

    /// Like [`AgendaRepo::list`], joined with the owning meeting's title and date.
    pub async fn list_with_meeting(
        pool: &PgPool,
        filter: &AgendaFilter,
    ) -> Result<Vec<AgendaWithMeeting>, sqlx::Error> {
        let (conditions, binds) = build_agenda_filter(filter);
        let query = format!(
            "SELECT {A_COLUMNS}, m.meeting_title, m.meeting_date \
             FROM meeting_agendas a \
             LEFT JOIN meeting_reports m ON m.meeting_number = a.meeting_number \
             WHERE {conditions} \
             ORDER BY a.meeting_number DESC, a.agenda_number, a.id"
        );
        let mut q = sqlx::query_as::<_, AgendaWithMeeting>(&query);
        for value in &binds {
            q = q.bind(value.as_str());
        }
        q.fetch_all(pool).await
    }

    /// Find an active agenda item by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Agenda>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM meeting_agendas WHERE id = $1 AND is_active");
        sqlx::query_as::<_, Agenda>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        input: &CreateAgenda,
        created_by: &str,
    ) -> Result<Agenda, sqlx::Error> {
        let query = format!(
            "INSERT INTO meeting_agendas
                (meeting_number, agenda_number, agenda_topic, agenda_type,
                 submitting_department, description, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agenda>(&query)
            .bind(&input.meeting_number)
            .bind(&input.agenda_number)
            .bind(&input.agenda_topic)
            .bind(&input.agenda_type)
            .bind(&input.submitting_department)
            .bind(&input.description)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Update an active agenda item. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAgenda,
        updated_by: &str,
    ) -> Result<Option<Agenda>, sqlx::Error> {
        let query = format!(
            "UPDATE meeting_agendas SET
                meeting_number = COALESCE($2, meeting_number),
                agenda_number = COALESCE($3, agenda_number),
                agenda_topic = COALESCE($4, agenda_topic),
                agenda_type = COALESCE($5, agenda_type),
                submitting_department = COALESCE($6, submitting_department),
                description = COALESCE($7, description),
                updated_by = $8,
                updated_at = NOW()
             WHERE id = $1 AND is_active
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agenda>(&query)
            .bind(id)
            .bind(&input.meeting_number)
            .bind(&input.agenda_number)
            .bind(&input.agenda_topic)
            .bind(&input.agenda_type)
            .bind(&input.submitting_department)
            .bind(&input.description)
            .bind(updated_by)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an agenda item, returning the updated row.
    ///
    /// Returns `None` if the item does not exist or is already inactive.
    /// Attachments are not touched; see
    /// [`AttachedFileRepo::soft_delete_for_agendas`](crate::repositories::AttachedFileRepo::soft_delete_for_agendas).
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<Option<Agenda>, sqlx::Error> {
        let query = format!(
            "UPDATE meeting_agendas
                SET is_active = FALSE, deleted_at = NOW(), updated_at = NOW()
              WHERE id = $1 AND is_active
              RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agenda>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete every active agenda item in `ids` with one statement.
    pub async fn bulk_soft_delete(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<Agenda>, sqlx::Error> {
        let query = format!(
            "UPDATE meeting_agendas
                SET is_active = FALSE, deleted_at = NOW(), updated_at = NOW()
              WHERE id = ANY($1) AND is_active
              RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agenda>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}

/// Build the condition list (against alias `a`) for an agenda filter.
///
/// Always starts with the active-row condition, so the result is never empty.
fn build_agenda_filter(filter: &AgendaFilter) -> (String, Vec<String>) {
    let mut conditions = vec!["a.is_active".to_string()];
    let mut binds: Vec<String> = Vec::new();

    let columns = [
        ("a.meeting_number", &filter.meeting_number),
        ("a.submitting_department", &filter.department),
        ("a.agenda_type", &filter.agenda_type),
    ];
    for (column, value) in columns {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            binds.push(value.to_string());
            conditions.push(format!("{column} = ${}", binds.len()));
        }
    }

    (conditions.join(" AND "), binds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_lists_only_active_rows() {
        let (clause, binds) = build_agenda_filter(&AgendaFilter::default());
        assert_eq!(clause, "a.is_active");
        assert!(binds.is_empty());
    }

    #[test]
    fn filters_are_anded_in_order() {
        let filter = AgendaFilter {
            meeting_number: None,
            department: Some("HR".into()),
            agenda_type: Some("เพื่อทราบ".into()),
        };
        let (clause, binds) = build_agenda_filter(&filter);
        assert_eq!(
            clause,
            "a.is_active AND a.submitting_department = $1 AND a.agenda_type = $2"
        );
        assert_eq!(binds, vec!["HR".to_string(), "เพื่อทราบ".to_string()]);
    }
}

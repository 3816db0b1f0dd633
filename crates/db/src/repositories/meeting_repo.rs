//! Repository for the `meeting_reports` table.

use minutes_core::types::DbId;
use sqlx::PgPool;

use crate::models::meeting::{CreateMeeting, Meeting, MeetingFilter, MeetingWithStats, UpdateMeeting};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, meeting_number, meeting_title, meeting_date, meeting_time, location, \
    department, file_path, file_size, created_by, updated_by, created_at, updated_at";

/// Same columns qualified with the `m` alias, for joined queries.
const M_COLUMNS: &str = "\
    m.id, m.meeting_number, m.meeting_title, m.meeting_date, m.meeting_time, m.location, \
    m.department, m.file_path, m.file_size, m.created_by, m.updated_by, m.created_at, \
    m.updated_at";

/// Provides CRUD operations for meetings. Meetings are hard-deleted.
pub struct MeetingRepo;

impl MeetingRepo {
    /// List meetings matching `filter`, newest meeting date first.
    pub async fn list(pool: &PgPool, filter: &MeetingFilter) -> Result<Vec<Meeting>, sqlx::Error> {
        let (where_clause, binds) = build_meeting_filter(filter);
        let query = format!(
            "SELECT {M_COLUMNS} FROM meeting_reports m {where_clause} \
             ORDER BY m.meeting_date DESC, m.id DESC"
        );
        let mut q = sqlx::query_as::<_, Meeting>(&query);
        for value in &binds {
            q = q.bind(value.as_str());
        }
        q.fetch_all(pool).await
    }

    /// List meetings matching `filter` with their active agenda count and
    /// report status.
    pub async fn list_with_stats(
        pool: &PgPool,
        filter: &MeetingFilter,
    ) -> Result<Vec<MeetingWithStats>, sqlx::Error> {
        let (where_clause, binds) = build_meeting_filter(filter);
        let query = format!(
            "SELECT {M_COLUMNS}, \
                (SELECT COUNT(*) FROM meeting_agendas a \
                  WHERE a.meeting_number = m.meeting_number AND a.is_active) AS agenda_count, \
                (m.file_size > 0) AS has_report \
             FROM meeting_reports m {where_clause} \
             ORDER BY m.meeting_date DESC, m.id DESC"
        );
        let mut q = sqlx::query_as::<_, MeetingWithStats>(&query);
        for value in &binds {
            q = q.bind(value.as_str());
        }
        q.fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Meeting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM meeting_reports WHERE id = $1");
        sqlx::query_as::<_, Meeting>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether another meeting already uses `meeting_number`.
    ///
    /// `except` excludes one id, so an update may keep its own number.
    pub async fn number_taken(
        pool: &PgPool,
        meeting_number: &str,
        except: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM meeting_reports
                 WHERE meeting_number = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(meeting_number)
        .bind(except)
        .fetch_one(pool)
        .await
    }

    /// Insert a meeting without a report document.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMeeting,
        created_by: &str,
    ) -> Result<Meeting, sqlx::Error> {
        let query = format!(
            "INSERT INTO meeting_reports
                (meeting_number, meeting_title, meeting_date, meeting_time,
                 location, department, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Meeting>(&query)
            .bind(&input.meeting_number)
            .bind(&input.meeting_title)
            .bind(input.meeting_date)
            .bind(&input.meeting_time)
            .bind(&input.location)
            .bind(&input.department)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Update a meeting. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMeeting,
        updated_by: &str,
    ) -> Result<Option<Meeting>, sqlx::Error> {
        let query = format!(
            "UPDATE meeting_reports SET
                meeting_number = COALESCE($2, meeting_number),
                meeting_title = COALESCE($3, meeting_title),
                meeting_date = COALESCE($4, meeting_date),
                meeting_time = COALESCE($5, meeting_time),
                location = COALESCE($6, location),
                department = COALESCE($7, department),
                updated_by = $8,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Meeting>(&query)
            .bind(id)
            .bind(&input.meeting_number)
            .bind(&input.meeting_title)
            .bind(input.meeting_date)
            .bind(&input.meeting_time)
            .bind(&input.location)
            .bind(&input.department)
            .bind(updated_by)
            .fetch_optional(pool)
            .await
    }

    /// Point the meeting's report document at a stored file.
    pub async fn set_report(
        pool: &PgPool,
        id: DbId,
        file_path: &str,
        file_size: i64,
        updated_by: &str,
    ) -> Result<Option<Meeting>, sqlx::Error> {
        let query = format!(
            "UPDATE meeting_reports
                SET file_path = $2, file_size = $3, updated_by = $4, updated_at = NOW()
              WHERE id = $1
              RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Meeting>(&query)
            .bind(id)
            .bind(file_path)
            .bind(file_size)
            .bind(updated_by)
            .fetch_optional(pool)
            .await
    }

    /// Detach the report document, marking the meeting as pending again.
    pub async fn clear_report(
        pool: &PgPool,
        id: DbId,
        updated_by: &str,
    ) -> Result<Option<Meeting>, sqlx::Error> {
        Self::set_report(pool, id, "", 0, updated_by).await
    }

    /// Permanently delete a meeting, returning the removed row.
    ///
    /// Attachments are removed by the `ON DELETE CASCADE` foreign key; callers
    /// collect their paths first if the bytes must go too.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Meeting>, sqlx::Error> {
        let query = format!("DELETE FROM meeting_reports WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Meeting>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete every meeting in `ids` with one statement, returning the
    /// removed rows. Unknown ids are ignored.
    pub async fn bulk_delete(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Meeting>, sqlx::Error> {
        let query =
            format!("DELETE FROM meeting_reports WHERE id = ANY($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Meeting>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build a WHERE clause (against alias `m`) and its text bind values.
fn build_meeting_filter(filter: &MeetingFilter) -> (String, Vec<String>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        binds.push(format!("%{}%", escape_like(search)));
        let idx = binds.len();
        conditions.push(format!(
            "(m.meeting_title ILIKE ${idx} ESCAPE '\\' \
              OR m.meeting_number ILIKE ${idx} ESCAPE '\\' \
              OR m.location ILIKE ${idx} ESCAPE '\\')"
        ));
    }

    if let Some(department) = filter.department.as_deref().filter(|s| !s.is_empty()) {
        binds.push(department.to_string());
        conditions.push(format!("m.department = ${}", binds.len()));
    }

    match filter.has_report {
        Some(true) => conditions.push("m.file_size > 0".to_string()),
        Some(false) => conditions.push("m.file_size = 0".to_string()),
        None => {}
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, binds)
}

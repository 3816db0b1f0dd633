//! Repository for the `attached_files` table.

use minutes_core::types::DbId;
use sqlx::PgPool;

use crate::models::attached_file::{AttachedFile, AttachmentOwner, NewAttachedFile, StoredFileEntry};

const COLUMNS: &str = "\
    id, meeting_id, agenda_id, file_name, file_path, file_size, file_type, \
    uploaded_by, is_active, deleted_at, created_at";

/// Number of bind parameters per row in [`AttachedFileRepo::insert_many`].
const INSERT_PARAMS_PER_ROW: usize = 6;

/// Attachment storage for meetings and agenda items.
pub struct AttachedFileRepo;

impl AttachedFileRepo {
    /// Active attachments of one owner, oldest first.
    pub async fn list_for(
        pool: &PgPool,
        owner: AttachmentOwner,
    ) -> Result<Vec<AttachedFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attached_files \
             WHERE {} = $1 AND is_active \
             ORDER BY created_at, id",
            owner.column()
        );
        sqlx::query_as::<_, AttachedFile>(&query)
            .bind(owner.id())
            .fetch_all(pool)
            .await
    }

    /// Active attachments of several agenda items in one query.
    pub async fn list_for_agendas(
        pool: &PgPool,
        agenda_ids: &[DbId],
    ) -> Result<Vec<AttachedFile>, sqlx::Error> {
        if agenda_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM attached_files \
             WHERE agenda_id = ANY($1) AND is_active \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, AttachedFile>(&query)
            .bind(agenda_ids)
            .fetch_all(pool)
            .await
    }

    /// Find an active attachment by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AttachedFile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attached_files WHERE id = $1 AND is_active");
        sqlx::query_as::<_, AttachedFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record several stored files for one owner with a single INSERT.
    pub async fn insert_many(
        pool: &PgPool,
        owner: AttachmentOwner,
        files: &[NewAttachedFile],
        uploaded_by: &str,
    ) -> Result<Vec<AttachedFile>, sqlx::Error> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<String> = (0..files.len())
            .map(|row| {
                let base = row * INSERT_PARAMS_PER_ROW;
                let placeholders: Vec<String> = (1..=INSERT_PARAMS_PER_ROW)
                    .map(|i| format!("${}", base + i))
                    .collect();
                format!("({})", placeholders.join(", "))
            })
            .collect();

        let query = format!(
            "INSERT INTO attached_files \
                ({}, file_name, file_path, file_size, file_type, uploaded_by) \
             VALUES {} \
             RETURNING {COLUMNS}",
            owner.column(),
            rows.join(", ")
        );

        let mut q = sqlx::query_as::<_, AttachedFile>(&query);
        for file in files {
            q = q
                .bind(owner.id())
                .bind(&file.file_name)
                .bind(&file.file_path)
                .bind(file.file_size)
                .bind(&file.file_type)
                .bind(uploaded_by);
        }
        q.fetch_all(pool).await
    }

    /// Permanently delete an attachment, returning the removed row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<AttachedFile>, sqlx::Error> {
        let query = format!("DELETE FROM attached_files WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, AttachedFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete the listed attachments of one agenda item.
    ///
    /// Ids belonging to other owners are left alone.
    pub async fn delete_for_agenda(
        pool: &PgPool,
        agenda_id: DbId,
        file_ids: &[DbId],
    ) -> Result<Vec<AttachedFile>, sqlx::Error> {
        if file_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "DELETE FROM attached_files \
             WHERE agenda_id = $1 AND id = ANY($2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttachedFile>(&query)
            .bind(agenda_id)
            .bind(file_ids)
            .fetch_all(pool)
            .await
    }

    /// Soft-delete every active attachment of the given agenda items.
    /// Returns the number of rows marked.
    pub async fn soft_delete_for_agendas(
        pool: &PgPool,
        agenda_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE attached_files SET is_active = FALSE, deleted_at = NOW() \
             WHERE agenda_id = ANY($1) AND is_active",
        )
        .bind(agenda_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Public paths of every attachment (active or not) of the given meetings.
    pub async fn paths_for_meetings(
        pool: &PgPool,
        meeting_ids: &[DbId],
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT file_path FROM attached_files WHERE meeting_id = ANY($1)",
        )
        .bind(meeting_ids)
        .fetch_all(pool)
        .await
    }

    /// Every stored file known to the system, newest first: report
    /// documents, meeting attachments and active agenda attachments.
    pub async fn list_stored_files(pool: &PgPool) -> Result<Vec<StoredFileEntry>, sqlx::Error> {
        sqlx::query_as::<_, StoredFileEntry>(
            "SELECT 'meeting_report' AS kind, m.id, m.meeting_number, m.meeting_title,
                    regexp_replace(m.file_path, '^.*/', '') AS file_name,
                    m.file_path, m.file_size,
                    COALESCE(m.updated_by, m.created_by) AS uploaded_by,
                    m.updated_at AS created_at
               FROM meeting_reports m
              WHERE m.file_size > 0
             UNION ALL
             SELECT 'meeting_file', f.id, m.meeting_number, m.meeting_title,
                    f.file_name, f.file_path, f.file_size, f.uploaded_by, f.created_at
               FROM attached_files f
               JOIN meeting_reports m ON m.id = f.meeting_id
              WHERE f.is_active
             UNION ALL
             SELECT 'agenda_file', f.id, a.meeting_number, m.meeting_title,
                    f.file_name, f.file_path, f.file_size, f.uploaded_by, f.created_at
               FROM attached_files f
               JOIN meeting_agendas a ON a.id = f.agenda_id
               LEFT JOIN meeting_reports m ON m.meeting_number = a.meeting_number
              WHERE f.is_active
             ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await
    }
}

//! Aggregate queries backing the management statistics endpoints.

use sqlx::PgPool;

use crate::models::stats::{StorageUsage, SystemCounts};

/// Read-only aggregates over meetings, agenda items and attachments.
pub struct StatsRepo;

impl StatsRepo {
    /// System-wide counters in one round trip. Soft-deleted agenda items and
    /// attachments are excluded.
    pub async fn system_counts(pool: &PgPool) -> Result<SystemCounts, sqlx::Error> {
        sqlx::query_as::<_, SystemCounts>(
            "SELECT
                (SELECT COUNT(*) FROM meeting_reports)::BIGINT AS meetings_total,
                (SELECT COUNT(*) FROM meeting_agendas WHERE is_active)::BIGINT AS agendas_total,
                (SELECT COUNT(*) FROM meeting_reports WHERE file_size > 0)::BIGINT
                    AS reports_uploaded,
                (SELECT COALESCE(SUM(file_size), 0) FROM meeting_reports)::BIGINT
                    AS report_bytes,
                (SELECT COUNT(*) FROM attached_files WHERE is_active)::BIGINT
                    AS attachments_total,
                (SELECT COALESCE(SUM(file_size), 0) FROM attached_files WHERE is_active)::BIGINT
                    AS attachment_bytes",
        )
        .fetch_one(pool)
        .await
    }

    /// Files and bytes held as meeting report documents.
    pub async fn report_usage(pool: &PgPool) -> Result<StorageUsage, sqlx::Error> {
        sqlx::query_as::<_, StorageUsage>(
            "SELECT COUNT(*)::BIGINT AS count, COALESCE(SUM(file_size), 0)::BIGINT AS size_bytes
               FROM meeting_reports
              WHERE file_size > 0",
        )
        .fetch_one(pool)
        .await
    }

    /// Files and bytes held as active meeting attachments.
    pub async fn meeting_attachment_usage(pool: &PgPool) -> Result<StorageUsage, sqlx::Error> {
        sqlx::query_as::<_, StorageUsage>(
            "SELECT COUNT(*)::BIGINT AS count, COALESCE(SUM(file_size), 0)::BIGINT AS size_bytes
               FROM attached_files
              WHERE meeting_id IS NOT NULL AND is_active",
        )
        .fetch_one(pool)
        .await
    }

    /// Files and bytes held as active agenda attachments.
    pub async fn agenda_attachment_usage(pool: &PgPool) -> Result<StorageUsage, sqlx::Error> {
        sqlx::query_as::<_, StorageUsage>(
            "SELECT COUNT(*)::BIGINT AS count, COALESCE(SUM(file_size), 0)::BIGINT AS size_bytes
               FROM attached_files
              WHERE agenda_id IS NOT NULL AND is_active",
        )
        .fetch_one(pool)
        .await
    }
}

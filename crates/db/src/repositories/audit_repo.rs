//! Repository for the append-only `audit_logs` table.

use sqlx::PgPool;

use crate::models::audit::{AuditLog, CreateAuditLog};

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "\
    id, username, action, resource_type, resource_id, details, \
    ip_address, user_agent, created_at";

/// Upper bound for [`AuditLogRepo::recent`].
pub const MAX_RECENT: i64 = 100;

/// Insert and read operations for audit logs. There is no update or delete.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append one audit log entry.
    pub async fn insert(pool: &PgPool, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs
                (username, action, resource_type, resource_id, details, ip_address, user_agent)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(&entry.username)
            .bind(&entry.action)
            .bind(&entry.resource_type)
            .bind(entry.resource_id)
            .bind(&entry.details)
            .bind(&entry.ip_address)
            .bind(&entry.user_agent)
            .fetch_one(pool)
            .await
    }

    /// The most recent entries, newest first. `limit` is clamped to
    /// `1..=MAX_RECENT`.
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<AuditLog>, sqlx::Error> {
        let limit = limit.clamp(1, MAX_RECENT);
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Entries with the given action, oldest first.
    pub async fn list_by_action(
        pool: &PgPool,
        action: &str,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM audit_logs WHERE action = $1 ORDER BY id");
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(action)
            .fetch_all(pool)
            .await
    }

    /// Total number of entries.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM audit_logs")
            .fetch_one(pool)
            .await
    }
}

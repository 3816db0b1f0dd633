//! Aggregates for the management console.

use serde::Serialize;
use sqlx::FromRow;

/// System-wide counters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SystemCounts {
    pub meetings_total: i64,
    pub agendas_total: i64,
    pub reports_uploaded: i64,
    pub report_bytes: i64,
    pub attachments_total: i64,
    pub attachment_bytes: i64,
}

/// Number of files and total bytes for one storage category.
#[derive(Debug, Clone, Copy, Default, FromRow, Serialize)]
pub struct StorageUsage {
    pub count: i64,
    pub size_bytes: i64,
}

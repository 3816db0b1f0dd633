//! Audit log entity model and DTOs.
//!
//! Audit rows have no `updated_at` field: they are never modified.

use minutes_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A single audit log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub username: String,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a new audit log entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub username: String,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

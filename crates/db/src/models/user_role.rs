//! Local role assignment rows.

use minutes_core::roles::{resolve_assignment, RoleAssignment};
use minutes_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table. Only role and activation live here;
/// identity attributes come from the personnel directory.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRole {
    pub id: DbId,
    pub username: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserRole {
    /// Effective assignment for this row.
    pub fn assignment(&self) -> RoleAssignment {
        resolve_assignment(Some((&self.role, self.is_active)))
    }
}

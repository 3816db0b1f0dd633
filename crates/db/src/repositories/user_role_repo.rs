//! Repository for the `users` role table.

use sqlx::PgPool;

use crate::models::user_role::UserRole;

const COLUMNS: &str = "id, username, role, is_active, created_at, updated_at";

/// Lookups and provisioning for local role assignments.
pub struct UserRoleRepo;

impl UserRoleRepo {
    /// Find the role row for `username`, if one has been provisioned.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<UserRole>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, UserRole>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Create or replace the role assignment for `username`.
    pub async fn upsert(
        pool: &PgPool,
        username: &str,
        role: &str,
        is_active: bool,
    ) -> Result<UserRole, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, role, is_active)
             VALUES ($1, $2, $3)
             ON CONFLICT (username) DO UPDATE
                SET role = EXCLUDED.role,
                    is_active = EXCLUDED.is_active,
                    updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRole>(&query)
            .bind(username)
            .bind(role)
            .bind(is_active)
            .fetch_one(pool)
            .await
    }
}

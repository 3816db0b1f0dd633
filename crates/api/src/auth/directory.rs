//! Credential lookup against the external personnel directory (HR database).
//!
//! The directory only answers "do these credentials match, and what is this
//! person called". Roles are assigned locally; see `UserRoleRepo`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::FromRow;

use super::password::legacy_digest;

/// How long to wait for a directory connection before reporting it unavailable.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Name fields of a directory entry whose credentials matched.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Personnel {
    pub username: String,
    pub prefix: Option<String>,
    pub fname: Option<String>,
    pub lname: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Personnel directory unavailable: {0}")]
    Unavailable(String),
}

/// Source of truth for who may log in.
#[async_trait]
pub trait PersonnelDirectory: Send + Sync {
    /// Look up `username` with the given plaintext password.
    ///
    /// `Ok(None)` means the credentials did not match.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Personnel>, DirectoryError>;

    /// Confirm the directory is reachable.
    async fn ping(&self) -> Result<(), DirectoryError>;
}

/// [`PersonnelDirectory`] backed by the HR `personnel` table in MariaDB.
#[derive(Clone)]
pub struct MySqlPersonnelDirectory {
    pool: MySqlPool,
}

impl MySqlPersonnelDirectory {
    /// Build a lazily connecting pool, so the service can start (and report
    /// the directory as down) while the HR database is unreachable.
    pub fn connect_lazy(url: &str) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy(url)?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl PersonnelDirectory for MySqlPersonnelDirectory {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Personnel>, DirectoryError> {
        sqlx::query_as::<_, Personnel>(
            "SELECT username, prefix, fname, lname FROM personnel \
             WHERE username = ? AND password = ? \
             LIMIT 1",
        )
        .bind(username)
        .bind(legacy_digest(password))
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)
    }

    async fn ping(&self) -> Result<(), DirectoryError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(unavailable)
    }
}

fn unavailable(err: sqlx::Error) -> DirectoryError {
    tracing::error!(error = %err, "Personnel directory query failed");
    DirectoryError::Unavailable(err.to_string())
}

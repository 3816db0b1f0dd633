use std::sync::Arc;

use crate::audit::AuditRecorder;
use crate::auth::directory::PersonnelDirectory;
use crate::auth::jwt::TokenService;
use crate::config::ServerConfig;
use crate::storage::UploadStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Primary database connection pool.
    pub pool: minutes_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Credential lookup against the personnel directory.
    pub directory: Arc<dyn PersonnelDirectory>,
    /// Session token signing and verification.
    pub tokens: TokenService,
    /// Audit trail writer.
    pub audit: AuditRecorder,
    /// Upload directory.
    pub uploads: UploadStore,
}

impl AppState {
    /// Assemble the state from its externally constructed handles.
    pub fn new(
        pool: minutes_db::DbPool,
        config: ServerConfig,
        directory: Arc<dyn PersonnelDirectory>,
    ) -> Self {
        let tokens = TokenService::new(&config.jwt);
        let audit = AuditRecorder::new(pool.clone());
        let uploads = UploadStore::new(config.uploads_path.clone(), config.max_upload_bytes);
        Self {
            pool,
            config: Arc::new(config),
            directory,
            tokens,
            audit,
            uploads,
        }
    }
}

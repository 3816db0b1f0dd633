//! Best-effort audit trail.
//!
//! Handlers record an [`AuditEvent`] after their primary effect succeeded.
//! A failed insert is logged and otherwise ignored: the response the caller
//! sees never depends on the audit table.

use minutes_core::audit::redact_sensitive_fields;
use minutes_core::types::DbId;
use minutes_db::models::audit::CreateAuditLog;
use minutes_db::repositories::AuditLogRepo;
use minutes_db::DbPool;
use serde::Serialize;

use crate::extract::RequestOrigin;

/// One auditable action.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub action: &'static str,
    pub resource_type: Option<&'static str>,
    pub resource_id: Option<DbId>,
    pub detail: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            resource_type: None,
            resource_id: None,
            detail: None,
        }
    }

    pub fn resource(mut self, resource_type: &'static str, resource_id: Option<DbId>) -> Self {
        self.resource_type = Some(resource_type);
        self.resource_id = resource_id;
        self
    }

    /// Attach structured detail. Sensitive keys are redacted; a value that
    /// cannot be serialized is dropped with a warning.
    pub fn detail(mut self, detail: impl Serialize) -> Self {
        match serde_json::to_value(detail) {
            Ok(value) => self.detail = Some(redact_sensitive_fields(&value)),
            Err(e) => {
                tracing::warn!(action = self.action, error = %e, "Dropping unserializable audit detail");
            }
        }
        self
    }
}

/// Writes audit events to `audit_logs`.
#[derive(Clone)]
pub struct AuditRecorder {
    pool: DbPool,
}

impl AuditRecorder {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append `event` on behalf of `actor`. Never fails.
    pub async fn record(&self, actor: &str, event: AuditEvent, origin: &RequestOrigin) {
        let entry = CreateAuditLog {
            username: actor.to_string(),
            action: event.action.to_string(),
            resource_type: event.resource_type.map(String::from),
            resource_id: event.resource_id,
            details: event.detail,
            ip_address: origin.ip_address.clone(),
            user_agent: origin.user_agent.clone(),
        };

        if let Err(e) = AuditLogRepo::insert(&self.pool, &entry).await {
            tracing::warn!(
                actor,
                action = event.action,
                error = %e,
                "Failed to write audit log entry"
            );
        }
    }
}

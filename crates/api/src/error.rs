use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use minutes_core::error::CoreError;
use minutes_core::messages;
use minutes_core::uploads::UploadError;
use serde::Serialize;

use crate::auth::directory::DirectoryError;
use crate::auth::jwt::TokenError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `minutes_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The bearer token was absent, malformed or expired.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The personnel directory could not be queried.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// A multipart upload was rejected.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// JSON body of every failed request.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<String>>,
    /// Diagnostic text, only in debug builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields = None;

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, .. } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    not_found_message(entity).to_string(),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::MissingFields(missing) => {
                    fields = Some(missing.clone());
                    (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        format!("{} ({})", messages::MISSING_FIELDS, missing.join(", ")),
                    )
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Authentication ---
            AppError::Token(err) => match err {
                TokenError::Missing => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    messages::LOGIN_REQUIRED.to_string(),
                ),
                TokenError::Invalid | TokenError::Expired => (
                    StatusCode::FORBIDDEN,
                    "INVALID_TOKEN",
                    messages::TOKEN_INVALID.to_string(),
                ),
                TokenError::Signing(msg) => {
                    tracing::error!(error = %msg, "Token signing failed");
                    internal()
                }
            },
            AppError::Directory(err) => {
                tracing::warn!(error = %err, "Personnel directory unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "DIRECTORY_UNAVAILABLE",
                    messages::DIRECTORY_UNAVAILABLE.to_string(),
                )
            }

            // --- Uploads ---
            AppError::Upload(err) => {
                let message = match err {
                    UploadError::DisallowedType { .. } => messages::FILE_TYPE_NOT_ALLOWED,
                    UploadError::TooLarge { .. } => messages::FILE_TOO_LARGE,
                    UploadError::TooManyFiles { .. } => messages::TOO_MANY_FILES,
                    UploadError::NoFile => messages::NO_FILE_UPLOADED,
                    UploadError::Malformed(_) => messages::UPLOAD_MALFORMED,
                };
                (StatusCode::BAD_REQUEST, "UPLOAD_REJECTED", message.to_string())
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = ErrorBody {
            success: false,
            message,
            code,
            fields,
            error: cfg!(debug_assertions).then(|| self.to_string()),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        messages::INTERNAL_ERROR.to_string(),
    )
}

fn not_found_message(entity: &str) -> &'static str {
    match entity {
        "meeting" => messages::MEETING_NOT_FOUND,
        "agenda" => messages::AGENDA_NOT_FOUND,
        "file" => messages::FILE_NOT_FOUND,
        _ => messages::NOT_FOUND,
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            messages::NOT_FOUND.to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        messages::CONFLICT.to_string(),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

// ---------------------------------------------------------------------------
// Extractor rejections
// ---------------------------------------------------------------------------

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected JSON body");
        AppError::BadRequest(messages::INVALID_REQUEST_BODY.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected query string");
        AppError::BadRequest(messages::INVALID_REQUEST_BODY.to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected path parameters");
        AppError::BadRequest(messages::INVALID_REQUEST_BODY.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Upload(UploadError::Malformed(err.body_text()))
    }
}

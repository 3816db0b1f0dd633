//! Shared response envelope types for API handlers.
//!
//! Every successful response carries `"success": true`. Payloads go in
//! `data`; list endpoints add `count`, mutations add a localized `message`.
//! Use these types instead of ad-hoc `serde_json::json!` bodies.

use serde::Serialize;

/// Standard `{ "success": true, "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse::new(meeting).with_message(messages::MEETING_CREATED)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data,
        }
    }

    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl<T: Serialize> DataResponse<Vec<T>> {
    /// A list payload with its length in `count`.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::new(items)
        }
    }
}

/// `{ "success": true, "message": ... }` for actions with nothing to return.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// Result of a bulk delete.
#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: usize,
}

/// Result of a multi-file upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse<T: Serialize> {
    pub success: bool,
    pub message: &'static str,
    pub files_uploaded: usize,
    pub data: T,
}

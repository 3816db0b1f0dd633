//! Required-field checks for request payloads.
//!
//! Payload structs derive [`validator::Validate`] with `required` and
//! `length(min = 1)` on the fields the endpoint cannot do without; this
//! module turns the resulting errors into [`CoreError::MissingFields`].

use validator::{Validate, ValidationErrors};

use crate::error::CoreError;
use crate::messages;
use crate::types::DbId;

/// Names of the fields that failed validation, sorted for stable output.
pub fn failed_fields(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|name| name.to_string())
        .collect();
    fields.sort();
    fields
}

/// Validate `input`, reporting every absent or blank required field.
pub fn validate_required<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::MissingFields(failed_fields(&errors)))
}

/// Bulk operations need at least one target id.
pub fn require_ids(ids: Option<&[DbId]>) -> Result<&[DbId], CoreError> {
    match ids {
        Some(ids) if !ids.is_empty() => Ok(ids),
        _ => Err(CoreError::Validation(messages::IDS_REQUIRED.to_string())),
    }
}

//! Domain rules shared by the database and API layers.
//!
//! Nothing in this crate performs IO: it holds the error taxonomy, the role
//! model and access rules, the audit vocabulary, the upload policy and the
//! display formatting used in responses.

pub mod audit;
pub mod error;
pub mod format;
pub mod messages;
pub mod roles;
pub mod types;
pub mod uploads;
pub mod validation;

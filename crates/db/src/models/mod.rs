//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and partial updates
//! - Filter structs for list queries

pub mod agenda;
pub mod attached_file;
pub mod audit;
pub mod meeting;
pub mod stats;
pub mod user_role;

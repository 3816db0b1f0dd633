//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Every value reaches SQL through a
//! bind parameter.

pub mod agenda_repo;
pub mod attached_file_repo;
pub mod audit_repo;
pub mod meeting_repo;
pub mod stats_repo;
pub mod user_role_repo;

pub use agenda_repo::AgendaRepo;
pub use attached_file_repo::AttachedFileRepo;
pub use audit_repo::AuditLogRepo;
pub use meeting_repo::MeetingRepo;
pub use stats_repo::StatsRepo;
pub use user_role_repo::UserRoleRepo;

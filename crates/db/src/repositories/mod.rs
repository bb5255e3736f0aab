//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! `&PgPool` (or an open transaction) as the first argument. Mutations of
//! leads, students, applications, and tasks append their timeline event in
//! the same transaction as the write.

mod filter;

pub mod application_repo;
pub mod entity_repo;
pub mod lead_repo;
pub mod lookup_repo;
pub mod sequence_repo;
pub mod student_repo;
pub mod task_repo;
pub mod timeline_repo;
pub mod user_repo;

pub use application_repo::ApplicationRepo;
pub use entity_repo::EntityRepo;
pub use lead_repo::LeadRepo;
pub use lookup_repo::LookupRepo;
pub use sequence_repo::SequenceRepo;
pub use student_repo::StudentRepo;
pub use task_repo::TaskRepo;
pub use timeline_repo::TimelineRepo;
pub use user_repo::UserRepo;

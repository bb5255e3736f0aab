pub mod applications;
pub mod auth;
pub mod leads;
pub mod lookups;
pub mod students;
pub mod tasks;
pub mod timeline;

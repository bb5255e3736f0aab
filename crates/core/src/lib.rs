//! Domain types and rules for the admissions CRM.
//!
//! This crate has no I/O. It holds the id/timestamp aliases, the shared
//! [`error::CoreError`], string-backed status enums, sequence-code
//! formatting, lead conversion rules, the structural field diff used for
//! timeline descriptions, and pagination helpers.

#[macro_use]
mod text_enum;

pub mod application;
pub mod constraints;
pub mod diff;
pub mod entity;
pub mod error;
pub mod lead;
pub mod lookup;
pub mod pagination;
pub mod roles;
pub mod sequence;
pub mod task;
pub mod timeline;
pub mod types;

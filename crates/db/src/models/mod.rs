//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` entity structs matching database rows
//! - `Deserialize` create DTOs for inserts
//! - `Deserialize` update DTOs for the review and event update operations

pub mod cfs_submission;
pub mod community;
pub mod event;
pub mod meeting;
pub mod session;

//! Domain logic for community events: CFS review rules, event and session
//! schedule rules, timezone resolution, and the meeting-sync evaluator.
//!
//! Nothing in this crate touches the database or the network, so every rule
//! can be unit tested in isolation and reused by the `db` and `api` layers.

pub mod cfs;
pub mod error;
pub mod meeting_sync;
pub mod schedule;
pub mod timezone;
pub mod types;

//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Helpers that run inside a larger
//! transaction take `&mut sqlx::Transaction<'_, sqlx::Postgres>` instead.

pub mod attendee_repo;
pub mod cfs_label_repo;
pub mod cfs_submission_repo;
pub mod community_repo;
pub mod event_repo;
pub mod meeting_repo;
pub mod session_repo;
pub mod user_repo;

pub use attendee_repo::AttendeeRepo;
pub use cfs_label_repo::EventCfsLabelRepo;
pub use cfs_submission_repo::{CfsSubmissionRepo, SessionProposalRepo};
pub use community_repo::{CommunityRepo, GroupRepo, GroupSponsorRepo};
pub use event_repo::EventRepo;
pub use meeting_repo::MeetingRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;

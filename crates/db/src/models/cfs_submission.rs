//! CFS submission, session proposal and rating models.

use ocg_core::cfs::SubmissionStatus;
use ocg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `session_proposals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionProposal {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: String,
    pub session_kind_id: String,
    pub duration_minutes: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `cfs_submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CfsSubmission {
    pub id: DbId,
    pub event_id: DbId,
    pub session_proposal_id: DbId,
    pub status_id: String,
    pub action_required_message: Option<String>,
    pub reviewed_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A submission as shown in the review modal: the row plus proposal title,
/// label ids, linked session and rating summary.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CfsSubmissionDetail {
    pub id: DbId,
    pub event_id: DbId,
    pub session_proposal_id: DbId,
    pub status_id: String,
    pub action_required_message: Option<String>,
    pub reviewed_by: Option<DbId>,
    pub title: String,
    pub speaker_id: DbId,
    pub label_ids: Vec<DbId>,
    pub linked_session_id: Option<DbId>,
    pub average_rating: Option<f64>,
    pub ratings_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `cfs_submission_ratings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CfsSubmissionRating {
    pub cfs_submission_id: DbId,
    pub reviewer_id: DbId,
    pub stars: i16,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a session proposal.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionProposal {
    pub user_id: DbId,
    pub title: String,
    pub description: String,
    pub session_kind_id: String,
    pub duration_minutes: i32,
}

/// DTO for submitting a proposal to an event's call for speakers.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCfsSubmission {
    pub event_id: DbId,
    pub session_proposal_id: DbId,
}

/// A reviewer's decision on a submission.
///
/// `label_ids` replaces the label set when present and leaves it alone when
/// absent. `rating_stars` of `0` clears the reviewer's rating; absent leaves
/// it untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCfsSubmission {
    pub status_id: SubmissionStatus,
    #[serde(default)]
    pub action_required_message: Option<String>,
    #[serde(default)]
    pub label_ids: Option<Vec<DbId>>,
    #[serde(default)]
    pub rating_stars: Option<i16>,
    #[serde(default)]
    pub rating_comment: Option<String>,
}

//! Repository for call-for-speakers submissions, their labels and ratings.

use ocg_core::cfs::{
    normalize_message, requires_notification, validate_review_target, RatingChange,
    SubmissionStatus,
};
use ocg_core::error::CoreError;
use ocg_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::cfs_submission::{
    CfsSubmission, CfsSubmissionDetail, CfsSubmissionRating, CreateCfsSubmission,
    CreateSessionProposal, SessionProposal, UpdateCfsSubmission,
};

/// Column list for `cfs_submissions` queries.
const COLUMNS: &str = "id, event_id, session_proposal_id, status_id, action_required_message, \
    reviewed_by, created_at, updated_at";

/// Column list for `session_proposals` queries.
const PROPOSAL_COLUMNS: &str =
    "id, user_id, title, description, session_kind_id, duration_minutes, created_at, updated_at";

/// Column list for `cfs_submission_ratings` queries.
const RATING_COLUMNS: &str =
    "cfs_submission_id, reviewer_id, stars, comment, created_at, updated_at";

/// Stored state of a submission read under lock before a review.
#[derive(Debug, sqlx::FromRow)]
struct LockedSubmission {
    status_id: String,
    action_required_message: Option<String>,
}

/// Provides operations on a speaker's session proposals.
pub struct SessionProposalRepo;

impl SessionProposalRepo {
    /// Insert a new session proposal, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSessionProposal,
    ) -> Result<SessionProposal, sqlx::Error> {
        let query = format!(
            "INSERT INTO session_proposals \
                (user_id, title, description, session_kind_id, duration_minutes) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PROPOSAL_COLUMNS}"
        );
        sqlx::query_as::<_, SessionProposal>(&query)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.session_kind_id)
            .bind(input.duration_minutes)
            .fetch_one(pool)
            .await
    }
}

/// Provides submission and review operations.
pub struct CfsSubmissionRepo;

impl CfsSubmissionRepo {
    /// Submit a proposal to an event's call for speakers.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCfsSubmission,
    ) -> Result<CfsSubmission, sqlx::Error> {
        let query = format!(
            "INSERT INTO cfs_submissions (event_id, session_proposal_id) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CfsSubmission>(&query)
            .bind(input.event_id)
            .bind(input.session_proposal_id)
            .fetch_one(pool)
            .await
    }

    /// Speaker-initiated withdrawal. Withdrawn submissions are out of review.
    ///
    /// Returns `true` if the submission existed and was not already withdrawn.
    pub async fn withdraw(
        pool: &PgPool,
        event_id: DbId,
        submission_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE cfs_submissions SET status_id = $3, updated_at = now() \
             WHERE id = $1 AND event_id = $2 AND status_id <> $3",
        )
        .bind(submission_id)
        .bind(event_id)
        .bind(SubmissionStatus::Withdrawn.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a submission of an event with its review context.
    pub async fn find_for_event(
        pool: &PgPool,
        event_id: DbId,
        submission_id: DbId,
    ) -> Result<Option<CfsSubmissionDetail>, sqlx::Error> {
        sqlx::query_as::<_, CfsSubmissionDetail>(
            "SELECT s.id, s.event_id, s.session_proposal_id, s.status_id, \
                    s.action_required_message, s.reviewed_by, \
                    p.title, p.user_id AS speaker_id, \
                    COALESCE(( \
                        SELECT array_agg(sl.event_cfs_label_id ORDER BY sl.event_cfs_label_id) \
                        FROM cfs_submission_labels sl \
                        WHERE sl.cfs_submission_id = s.id \
                    ), '{}'::uuid[]) AS label_ids, \
                    (SELECT se.id FROM sessions se WHERE se.cfs_submission_id = s.id) \
                        AS linked_session_id, \
                    (SELECT AVG(r.stars)::float8 FROM cfs_submission_ratings r \
                        WHERE r.cfs_submission_id = s.id) AS average_rating, \
                    (SELECT COUNT(*) FROM cfs_submission_ratings r \
                        WHERE r.cfs_submission_id = s.id) AS ratings_count, \
                    s.created_at, s.updated_at \
             FROM cfs_submissions s \
             JOIN session_proposals p ON p.id = s.session_proposal_id \
             WHERE s.id = $1 AND s.event_id = $2",
        )
        .bind(submission_id)
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    /// List every reviewer's rating of a submission, newest first.
    pub async fn list_ratings(
        pool: &PgPool,
        event_id: DbId,
        submission_id: DbId,
    ) -> Result<Vec<CfsSubmissionRating>, sqlx::Error> {
        let query = format!(
            "SELECT {RATING_COLUMNS} FROM cfs_submission_ratings r \
             WHERE r.cfs_submission_id = $1 \
               AND EXISTS ( \
                   SELECT 1 FROM cfs_submissions s WHERE s.id = $1 AND s.event_id = $2 \
               ) \
             ORDER BY r.updated_at DESC"
        );
        sqlx::query_as::<_, CfsSubmissionRating>(&query)
            .bind(submission_id)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a reviewer's decision to a submission in one transaction.
    ///
    /// Returns `true` when the status or the action-required message changed,
    /// meaning the speaker should be notified. Label and rating changes alone
    /// return `false`.
    pub async fn update(
        pool: &PgPool,
        reviewer_id: DbId,
        event_id: DbId,
        submission_id: DbId,
        input: &UpdateCfsSubmission,
    ) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        let locked = sqlx::query_as::<_, LockedSubmission>(
            "SELECT s.status_id, s.action_required_message \
             FROM cfs_submissions s \
             WHERE s.id = $1 AND s.event_id = $2 AND s.status_id <> $3 \
             FOR UPDATE OF s",
        )
        .bind(submission_id)
        .bind(event_id)
        .bind(SubmissionStatus::Withdrawn.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "submission",
            id: submission_id,
        })?;

        // Read after the row lock so a link committed while we waited is visible.
        let has_linked_session: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM sessions WHERE cfs_submission_id = $1)",
        )
        .bind(submission_id)
        .fetch_one(&mut *tx)
        .await?;

        let previous_status: SubmissionStatus = locked.status_id.parse()?;
        validate_review_target(input.status_id, has_linked_session)?;

        let rating = input
            .rating_stars
            .map(|stars| RatingChange::from_stars(stars, input.rating_comment.as_deref()))
            .transpose()?;

        let label_ids = input.label_ids.as_ref().map(|ids| {
            let mut ids = ids.clone();
            ids.sort();
            ids.dedup();
            ids
        });
        if let Some(ids) = label_ids.as_ref().filter(|ids| !ids.is_empty()) {
            let found: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM event_cfs_labels WHERE event_id = $1 AND id = ANY($2)",
            )
            .bind(event_id)
            .bind(ids)
            .fetch_one(&mut *tx)
            .await?;
            if found != ids.len() as i64 {
                return Err(CoreError::Validation("invalid event CFS labels".to_string()).into());
            }
        }

        let message = normalize_message(input.action_required_message.as_deref());

        sqlx::query(
            "UPDATE cfs_submissions \
             SET status_id = $2, action_required_message = $3, reviewed_by = $4, \
                 updated_at = now() \
             WHERE id = $1",
        )
        .bind(submission_id)
        .bind(input.status_id.as_str())
        .bind(&message)
        .bind(reviewer_id)
        .execute(&mut *tx)
        .await?;

        if let Some(ids) = &label_ids {
            sqlx::query("DELETE FROM cfs_submission_labels WHERE cfs_submission_id = $1")
                .bind(submission_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO cfs_submission_labels (cfs_submission_id, event_cfs_label_id) \
                 SELECT $1, UNNEST($2::uuid[])",
            )
            .bind(submission_id)
            .bind(ids)
            .execute(&mut *tx)
            .await?;
        }

        match rating {
            Some(RatingChange::Upsert { stars, comment }) => {
                sqlx::query(
                    "INSERT INTO cfs_submission_ratings \
                        (cfs_submission_id, reviewer_id, stars, comment) \
                     VALUES ($1, $2, $3, $4) \
                     ON CONFLICT (cfs_submission_id, reviewer_id) DO UPDATE \
                     SET stars = EXCLUDED.stars, comment = EXCLUDED.comment, updated_at = now()",
                )
                .bind(submission_id)
                .bind(reviewer_id)
                .bind(stars)
                .bind(&comment)
                .execute(&mut *tx)
                .await?;
            }
            Some(RatingChange::Clear) => {
                sqlx::query(
                    "DELETE FROM cfs_submission_ratings \
                     WHERE cfs_submission_id = $1 AND reviewer_id = $2",
                )
                .bind(submission_id)
                .bind(reviewer_id)
                .execute(&mut *tx)
                .await?;
            }
            None => {}
        }

        tx.commit().await?;

        let notify = requires_notification(
            previous_status,
            locked.action_required_message.as_deref(),
            input.status_id,
            message.as_deref(),
        );

        tracing::info!(
            submission_id = %submission_id,
            event_id = %event_id,
            reviewer_id = %reviewer_id,
            status = %input.status_id,
            notify_speaker = notify,
            "CFS submission reviewed"
        );

        Ok(notify)
    }
}

//! Handlers for the CFS submission review modal.
//!
//! All endpoints require authentication via [`AuthUser`]; the authenticated
//! user is the acting reviewer.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use ocg_core::error::CoreError;
use ocg_core::types::DbId;
use ocg_db::models::cfs_submission::UpdateCfsSubmission;
use ocg_db::repositories::{CfsSubmissionRepo, EventCfsLabelRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a review.
#[derive(Debug, Serialize)]
pub struct ReviewOutcome {
    /// Whether the status or the action-required message changed.
    pub notify_speaker: bool,
}

/// GET /api/v1/events/{event_id}/submissions/{submission_id}
pub async fn get_submission(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((event_id, submission_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let submission = CfsSubmissionRepo::find_for_event(&state.pool, event_id, submission_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "submission",
            id: submission_id,
        }))?;

    Ok(Json(DataResponse { data: submission }))
}

/// PUT /api/v1/events/{event_id}/submissions/{submission_id}
///
/// Apply the reviewer's decision: status, message, labels and rating.
pub async fn update_submission(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((event_id, submission_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCfsSubmission>,
) -> AppResult<impl IntoResponse> {
    let notify_speaker =
        CfsSubmissionRepo::update(&state.pool, auth.user_id, event_id, submission_id, &input)
            .await?;

    Ok(Json(DataResponse {
        data: ReviewOutcome { notify_speaker },
    }))
}

/// GET /api/v1/events/{event_id}/submissions/{submission_id}/ratings
pub async fn list_ratings(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((event_id, submission_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let ratings = CfsSubmissionRepo::list_ratings(&state.pool, event_id, submission_id).await?;

    Ok(Json(DataResponse { data: ratings }))
}

/// GET /api/v1/events/{event_id}/cfs-labels
pub async fn list_labels(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let labels = EventCfsLabelRepo::list_for_event(&state.pool, event_id).await?;

    Ok(Json(DataResponse { data: labels }))
}

//! Handlers for meeting synchronization.
//!
//! `sync-check` runs the evaluator on caller-supplied snapshots without
//! touching the database. `out-of-sync` is the provisioning worker's queue.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use ocg_core::meeting_sync::MeetingSyncRequest;
use ocg_db::repositories::MeetingRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size of the out-of-sync queue.
const DEFAULT_QUEUE_LIMIT: i64 = 100;
/// Upper bound on the out-of-sync page size.
const MAX_QUEUE_LIMIT: i64 = 500;

/// Evaluator verdict.
#[derive(Debug, Serialize)]
pub struct SyncCheck {
    pub in_sync: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueueParams {
    pub limit: Option<i64>,
}

/// POST /api/v1/meetings/sync-check
pub async fn sync_check(
    _auth: AuthUser,
    Json(request): Json<MeetingSyncRequest>,
) -> AppResult<impl IntoResponse> {
    let in_sync = request.evaluate()?;
    tracing::debug!(in_sync, "Meeting sync evaluated");

    Ok(Json(DataResponse {
        data: SyncCheck { in_sync },
    }))
}

/// GET /api/v1/meetings/out-of-sync?limit=N
pub async fn list_out_of_sync(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<QueueParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_QUEUE_LIMIT)
        .clamp(1, MAX_QUEUE_LIMIT);
    let pending = MeetingRepo::list_out_of_sync(&state.pool, limit).await?;

    Ok(Json(DataResponse { data: pending }))
}

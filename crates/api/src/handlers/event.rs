//! Handler for the full-replace event update.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ocg_core::types::DbId;
use ocg_db::models::event::{UpdateContext, UpdateEvent};
use ocg_db::repositories::EventRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// PUT /api/v1/groups/{group_id}/events/{event_id}
///
/// Replace an event with its sessions, hosts, speakers, sponsors and CFS
/// labels. Returns 204 on success.
pub async fn update_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((group_id, event_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<StatusCode> {
    let max_participants = &state.config.meetings.max_participants;
    let mut ctx = UpdateContext::new(chrono::Utc::now());
    if !max_participants.is_empty() {
        ctx = ctx.with_max_participants(max_participants);
    }

    EventRepo::update(&state.pool, group_id, event_id, &input, &ctx).await?;

    tracing::info!(
        event_id = %event_id,
        group_id = %group_id,
        user_id = %auth.user_id,
        "Event update applied"
    );

    Ok(StatusCode::NO_CONTENT)
}

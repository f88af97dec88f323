//! Route definitions for event updates and CFS review.
//!
//! Two routers are provided:
//! - `group_router()` for group-scoped event routes mounted at `/groups`
//! - `event_router()` for event-scoped CFS routes mounted at `/events`

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{cfs_submission, event};
use crate::state::AppState;

/// Group-scoped event routes mounted at `/groups`.
///
/// ```text
/// PUT    /{group_id}/events/{event_id}   -> update_event
/// ```
pub fn group_router() -> Router<AppState> {
    Router::new().route("/{group_id}/events/{event_id}", put(event::update_event))
}

/// Event-scoped CFS routes mounted at `/events`.
///
/// ```text
/// GET    /{event_id}/cfs-labels                           -> list_labels
/// GET    /{event_id}/submissions/{submission_id}          -> get_submission
/// PUT    /{event_id}/submissions/{submission_id}          -> update_submission
/// GET    /{event_id}/submissions/{submission_id}/ratings  -> list_ratings
/// ```
pub fn event_router() -> Router<AppState> {
    Router::new()
        .route("/{event_id}/cfs-labels", get(cfs_submission::list_labels))
        .route(
            "/{event_id}/submissions/{submission_id}",
            get(cfs_submission::get_submission).put(cfs_submission::update_submission),
        )
        .route(
            "/{event_id}/submissions/{submission_id}/ratings",
            get(cfs_submission::list_ratings),
        )
}

pub mod events;
pub mod health;
pub mod meetings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /meetings/sync-check                                   evaluate meeting sync (POST)
/// /meetings/out-of-sync                                  provisioning queue (GET)
///
/// /groups/{group_id}/events/{event_id}                   replace event (PUT)
///
/// /events/{event_id}/cfs-labels                          list labels (GET)
/// /events/{event_id}/submissions/{submission_id}         get, review (PUT)
/// /events/{event_id}/submissions/{submission_id}/ratings list ratings (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/meetings", meetings::router())
        .nest("/groups", events::group_router())
        .nest("/events", events::event_router())
}

//! Route definitions for meeting synchronization, mounted at `/meetings`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::meeting;
use crate::state::AppState;

/// ```text
/// POST   /sync-check    -> sync_check
/// GET    /out-of-sync   -> list_out_of_sync
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync-check", post(meeting::sync_check))
        .route("/out-of-sync", get(meeting::list_out_of_sync))
}

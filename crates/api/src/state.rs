use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ocg_db::DbPool,
    /// Server configuration (JWT secret, meeting provider limits).
    pub config: Arc<ServerConfig>,
}

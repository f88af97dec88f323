//! Provisioned meeting models and the provisioning worker's view.

use ocg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `meetings` table.
///
/// `event_id` and `session_id` are both `None` once the owner was deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Meeting {
    pub id: DbId,
    pub event_id: Option<DbId>,
    pub session_id: Option<DbId>,
    pub provider_id: String,
    pub provider_meeting_id: String,
    pub join_url: String,
    pub password: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a meeting created at the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMeeting {
    pub event_id: Option<DbId>,
    pub session_id: Option<DbId>,
    pub provider_id: String,
    pub provider_meeting_id: String,
    pub join_url: String,
    pub password: Option<String>,
}

/// An event or session whose meeting needs the provisioning worker.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OutOfSyncMeeting {
    /// `"event"` or `"session"`.
    pub entity: String,
    pub id: DbId,
    pub event_id: DbId,
    pub meeting_requested: bool,
    pub meeting_provider_id: Option<String>,
    pub updated_at: Timestamp,
}

//! Session models.

use chrono::NaiveDateTime;
use ocg_core::meeting_sync::{
    MeetingRequested, SessionMeetingInput, SpeakerRef, StoredSessionMeeting,
};
use ocg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    pub event_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub kind_id: String,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub location: Option<String>,
    pub meeting_requested: bool,
    pub meeting_in_sync: Option<bool>,
    pub meeting_provider_id: Option<String>,
    pub meeting_hosts: Option<Vec<String>>,
    pub meeting_requires_password: bool,
    pub cfs_submission_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Session {
    /// Meeting-relevant snapshot of the stored row.
    pub fn stored_meeting(&self) -> StoredSessionMeeting {
        StoredSessionMeeting {
            name: self.name.clone(),
            kind_id: self.kind_id.clone(),
            starts_at: Some(self.starts_at),
            ends_at: self.ends_at,
            meeting_requested: self.meeting_requested,
            meeting_requires_password: self.meeting_requires_password,
            meeting_hosts: self.meeting_hosts.clone(),
        }
    }
}

/// Session entry of an event update. Entries without `id` create a session.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSession {
    #[serde(default)]
    pub id: Option<DbId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind_id: String,
    pub starts_at: NaiveDateTime,
    #[serde(default)]
    pub ends_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub meeting_requested: MeetingRequested,
    #[serde(default)]
    pub meeting_provider_id: Option<String>,
    #[serde(default)]
    pub meeting_hosts: Option<Vec<String>>,
    #[serde(default)]
    pub meeting_requires_password: Option<bool>,
    #[serde(default)]
    pub speakers: Vec<SpeakerRef>,
    /// Approved CFS submission this session was promoted from.
    #[serde(default)]
    pub cfs_submission_id: Option<DbId>,
}

impl UpdateSession {
    /// Meeting-relevant view of this entry, resolved in the event's timezone.
    pub fn meeting_input(&self, timezone: &str) -> SessionMeetingInput {
        SessionMeetingInput {
            name: self.name.clone(),
            kind_id: self.kind_id.clone(),
            starts_at: Some(self.starts_at),
            ends_at: self.ends_at,
            timezone: timezone.to_string(),
            meeting_requested: self.meeting_requested,
            meeting_requires_password: self.meeting_requires_password,
            meeting_hosts: self.meeting_hosts.clone(),
        }
    }
}

//! Event models and the full-replace update payload.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use ocg_core::meeting_sync::{EventMeetingInput, HostRef, MeetingRequested, SpeakerRef};
use ocg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::session::UpdateSession;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub group_id: DbId,
    pub name: String,
    pub description: String,
    pub kind_id: String,
    pub timezone: String,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub capacity: Option<i32>,
    pub published: bool,
    pub canceled: bool,
    pub deleted: bool,
    pub meeting_requested: bool,
    pub meeting_in_sync: Option<bool>,
    pub meeting_provider_id: Option<String>,
    pub meeting_hosts: Option<Vec<String>>,
    pub event_reminder_evaluated_for_starts_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `event_speakers` table, without audit columns.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct EventSpeaker {
    pub user_id: DbId,
    pub featured: bool,
}

/// A row from the `event_sponsors` table, without audit columns.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct EventSponsor {
    pub group_sponsor_id: DbId,
    pub level: String,
}

/// A row from the `event_cfs_labels` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventCfsLabel {
    pub id: DbId,
    pub event_id: DbId,
    pub name: String,
    pub color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating an event. Schedule times are wall-clock in `timezone`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub group_id: DbId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind_id: String,
    pub timezone: String,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
    pub capacity: Option<i32>,
    #[serde(default)]
    pub published: bool,
}

/// Sponsor entry of an event update.
#[derive(Debug, Clone, Deserialize)]
pub struct EventSponsorInput {
    pub group_sponsor_id: DbId,
    pub level: String,
}

/// CFS label entry of an event update. Entries without `id` create a label.
#[derive(Debug, Clone, Deserialize)]
pub struct CfsLabelInput {
    #[serde(default)]
    pub id: Option<DbId>,
    pub name: String,
    pub color: String,
}

/// DTO for replacing an event and everything nested under it.
///
/// Lists replace the stored ones wholesale; sessions missing from `sessions`
/// are deleted. `cfs_labels` is the exception: when absent the labels are
/// left untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEvent {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind_id: String,
    pub timezone: String,
    #[serde(default)]
    pub starts_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub ends_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub capacity: Option<i32>,
    #[serde(default)]
    pub meeting_requested: MeetingRequested,
    #[serde(default)]
    pub meeting_provider_id: Option<String>,
    #[serde(default)]
    pub meeting_hosts: Option<Vec<String>>,
    #[serde(default)]
    pub hosts: Vec<DbId>,
    #[serde(default)]
    pub speakers: Vec<SpeakerRef>,
    #[serde(default)]
    pub sponsors: Vec<EventSponsorInput>,
    #[serde(default)]
    pub sessions: Vec<UpdateSession>,
    #[serde(default)]
    pub cfs_labels: Option<Vec<CfsLabelInput>>,
}

impl UpdateEvent {
    /// Meeting-relevant view of this payload for the sync evaluator.
    pub fn meeting_input(&self) -> EventMeetingInput {
        EventMeetingInput {
            name: self.name.clone(),
            kind_id: self.kind_id.clone(),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            timezone: self.timezone.clone(),
            meeting_requested: self.meeting_requested,
            meeting_hosts: self.meeting_hosts.clone(),
            hosts: self.hosts.iter().copied().map(HostRef::Id).collect(),
            speakers: self.speakers.clone(),
        }
    }

    /// Every user id referenced by the event and its sessions.
    pub fn referenced_user_ids(&self) -> Vec<DbId> {
        let mut ids: Vec<DbId> = self
            .hosts
            .iter()
            .copied()
            .chain(self.speakers.iter().map(|s| s.user_id))
            .chain(
                self.sessions
                    .iter()
                    .flat_map(|s| s.speakers.iter().map(|sp| sp.user_id)),
            )
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Ambient inputs of an event update.
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext<'a> {
    /// Reference instant for past / live / future rules.
    pub now: Timestamp,
    /// Maximum participants per meeting provider id, when configured.
    pub max_participants: Option<&'a HashMap<String, i32>>,
}

impl<'a> UpdateContext<'a> {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now,
            max_participants: None,
        }
    }

    pub fn with_max_participants(mut self, max_participants: &'a HashMap<String, i32>) -> Self {
        self.max_participants = Some(max_participants);
        self
    }

    /// Configured maximum for `provider_id`, if any.
    pub fn provider_max(&self, provider_id: Option<&str>) -> Option<i32> {
        let provider_id = provider_id?;
        self.max_participants?.get(provider_id).copied()
    }
}

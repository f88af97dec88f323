//! Meeting-sync evaluator.
//!
//! Decides whether the virtual meeting provisioned for an event or session
//! still matches the entity after an update. The evaluator compares an *old*
//! snapshot (stored values, absolute times) with a *new* one (incoming
//! payload, wall-clock times plus timezone). A `false` answer means the
//! meeting must be re-provisioned or deleted by the provisioning worker.
//!
//! Hosts, meeting hosts and speakers are compared as sets over normalized
//! values, so ordering and the shape a host reference arrives in never make
//! a meeting look stale.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::timezone::resolve_local;
use crate::types::{DbId, Timestamp};

/// Kind id of sessions and events that happen only at a physical venue.
pub const KIND_IN_PERSON: &str = "in-person";

/* --------------------------------------------------------------------------
Input types
-------------------------------------------------------------------------- */

/// Three-state `meeting_requested` flag of an incoming payload.
///
/// `Absent` (field missing or null) is kept distinct from `No` so callers
/// can tell the two apart, but the evaluator treats both as "not requested".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeetingRequested {
    #[default]
    Absent,
    No,
    Yes,
}

impl MeetingRequested {
    pub fn is_requested(self) -> bool {
        self == Self::Yes
    }

    pub fn as_option(self) -> Option<bool> {
        match self {
            Self::Absent => None,
            Self::No => Some(false),
            Self::Yes => Some(true),
        }
    }
}

impl From<Option<bool>> for MeetingRequested {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Self::Absent,
            Some(false) => Self::No,
            Some(true) => Self::Yes,
        }
    }
}

impl From<bool> for MeetingRequested {
    fn from(value: bool) -> Self {
        Some(value).into()
    }
}

impl Serialize for MeetingRequested {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MeetingRequested {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<bool>::deserialize(deserializer)?.into())
    }
}

/// A host reference: either a bare user id or an object carrying `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostRef {
    Id(DbId),
    User { user_id: DbId },
}

impl HostRef {
    pub fn user_id(self) -> DbId {
        match self {
            Self::Id(id) | Self::User { user_id: id } => id,
        }
    }
}

/// A speaker reference. `featured` is part of the meeting identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeakerRef {
    pub user_id: DbId,
    #[serde(default)]
    pub featured: bool,
}

/// Stored meeting-relevant fields of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEventMeeting {
    pub name: String,
    pub kind_id: String,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub starts_at: Option<Timestamp>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub ends_at: Option<Timestamp>,
    #[serde(default)]
    pub meeting_requested: bool,
    #[serde(default)]
    pub meeting_hosts: Option<Vec<String>>,
    #[serde(default)]
    pub hosts: Vec<HostRef>,
    #[serde(default)]
    pub speakers: Vec<SpeakerRef>,
}

/// Incoming meeting-relevant fields of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMeetingInput {
    pub name: String,
    pub kind_id: String,
    #[serde(default)]
    pub starts_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub ends_at: Option<NaiveDateTime>,
    pub timezone: String,
    #[serde(default)]
    pub meeting_requested: MeetingRequested,
    #[serde(default)]
    pub meeting_hosts: Option<Vec<String>>,
    #[serde(default)]
    pub hosts: Vec<HostRef>,
    #[serde(default)]
    pub speakers: Vec<SpeakerRef>,
}

/// Stored meeting-relevant fields of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSessionMeeting {
    pub name: String,
    pub kind_id: String,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub starts_at: Option<Timestamp>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub ends_at: Option<Timestamp>,
    #[serde(default)]
    pub meeting_requested: bool,
    #[serde(default)]
    pub meeting_requires_password: bool,
    #[serde(default)]
    pub meeting_hosts: Option<Vec<String>>,
}

/// Incoming meeting-relevant fields of a session. `timezone` is the parent
/// event's timezone as sent in the same update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMeetingInput {
    pub name: String,
    pub kind_id: String,
    #[serde(default)]
    pub starts_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub ends_at: Option<NaiveDateTime>,
    pub timezone: String,
    #[serde(default)]
    pub meeting_requested: MeetingRequested,
    #[serde(default)]
    pub meeting_requires_password: Option<bool>,
    #[serde(default)]
    pub meeting_hosts: Option<Vec<String>>,
}

/// An evaluator call, tagged by the entity it is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum MeetingSyncRequest {
    Event {
        old: StoredEventMeeting,
        new: EventMeetingInput,
    },
    Session {
        old: StoredSessionMeeting,
        new: SessionMeetingInput,
    },
}

impl MeetingSyncRequest {
    pub fn evaluate(&self) -> Result<bool, CoreError> {
        match self {
            Self::Event { old, new } => is_event_meeting_in_sync(old, new),
            Self::Session { old, new } => is_session_meeting_in_sync(old, new),
        }
    }
}

/* --------------------------------------------------------------------------
Evaluation
-------------------------------------------------------------------------- */

/// Normalized view of everything a provisioned meeting was built from.
#[derive(Debug, PartialEq, Eq)]
struct MeetingFingerprint {
    name: String,
    kind_id: String,
    starts_at: Option<Timestamp>,
    ends_at: Option<Timestamp>,
    meeting_hosts: BTreeSet<String>,
    hosts: BTreeSet<DbId>,
    speakers: BTreeSet<SpeakerRef>,
    requires_password: bool,
}

fn meeting_host_set(hosts: Option<&[String]>) -> BTreeSet<String> {
    hosts
        .unwrap_or_default()
        .iter()
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}

fn host_set(hosts: &[HostRef]) -> BTreeSet<DbId> {
    hosts.iter().map(|h| h.user_id()).collect()
}

impl MeetingFingerprint {
    fn from_stored_event(old: &StoredEventMeeting) -> Self {
        Self {
            name: old.name.clone(),
            kind_id: old.kind_id.clone(),
            starts_at: old.starts_at,
            ends_at: old.ends_at,
            meeting_hosts: meeting_host_set(old.meeting_hosts.as_deref()),
            hosts: host_set(&old.hosts),
            speakers: old.speakers.iter().copied().collect(),
            requires_password: false,
        }
    }

    fn from_event_input(new: &EventMeetingInput) -> Result<Self, CoreError> {
        Ok(Self {
            name: new.name.clone(),
            kind_id: new.kind_id.clone(),
            starts_at: resolve_local(new.starts_at, &new.timezone)?,
            ends_at: resolve_local(new.ends_at, &new.timezone)?,
            meeting_hosts: meeting_host_set(new.meeting_hosts.as_deref()),
            hosts: host_set(&new.hosts),
            speakers: new.speakers.iter().copied().collect(),
            requires_password: false,
        })
    }

    fn from_stored_session(old: &StoredSessionMeeting) -> Self {
        Self {
            name: old.name.clone(),
            kind_id: old.kind_id.clone(),
            starts_at: old.starts_at,
            ends_at: old.ends_at,
            meeting_hosts: meeting_host_set(old.meeting_hosts.as_deref()),
            hosts: BTreeSet::new(),
            speakers: BTreeSet::new(),
            requires_password: old.meeting_requires_password,
        }
    }

    fn from_session_input(new: &SessionMeetingInput) -> Result<Self, CoreError> {
        Ok(Self {
            name: new.name.clone(),
            kind_id: new.kind_id.clone(),
            starts_at: resolve_local(new.starts_at, &new.timezone)?,
            ends_at: resolve_local(new.ends_at, &new.timezone)?,
            meeting_hosts: meeting_host_set(new.meeting_hosts.as_deref()),
            hosts: BTreeSet::new(),
            speakers: BTreeSet::new(),
            requires_password: new.meeting_requires_password.unwrap_or(false),
        })
    }
}

/// Whether the meeting provisioned for an event is still valid after the update.
pub fn is_event_meeting_in_sync(
    old: &StoredEventMeeting,
    new: &EventMeetingInput,
) -> Result<bool, CoreError> {
    let requested_before = old.meeting_requested;
    let requested_after = new.meeting_requested.is_requested();

    if !requested_before && !requested_after {
        return Ok(true);
    }
    if requested_before != requested_after {
        return Ok(false);
    }

    let before = MeetingFingerprint::from_stored_event(old);
    let after = MeetingFingerprint::from_event_input(new)?;
    Ok(before == after)
}

/// Whether the meeting provisioned for a session is still valid after the update.
///
/// Moving a session into or out of `in-person` always requires the
/// provisioning worker to act, whatever else changed.
pub fn is_session_meeting_in_sync(
    old: &StoredSessionMeeting,
    new: &SessionMeetingInput,
) -> Result<bool, CoreError> {
    let requested_before = old.meeting_requested;
    let requested_after = new.meeting_requested.is_requested();

    if !requested_before && !requested_after {
        return Ok(true);
    }
    if (old.kind_id == KIND_IN_PERSON) != (new.kind_id == KIND_IN_PERSON) {
        return Ok(false);
    }
    if requested_before != requested_after {
        return Ok(false);
    }

    let before = MeetingFingerprint::from_stored_session(old);
    let after = MeetingFingerprint::from_session_input(new)?;
    Ok(before == after)
}

/// Next stored value of `meeting_in_sync`.
///
/// A negative evaluation always writes `false`. A positive one keeps the
/// stored value: only the provisioning worker flips `false` back to `true`
/// once it has acted, and entities that never had a meeting stay `NULL`.
pub fn next_meeting_in_sync(current: Option<bool>, in_sync: bool) -> Option<bool> {
    if in_sync {
        current
    } else {
        Some(false)
    }
}

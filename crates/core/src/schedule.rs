//! Event and session schedule rules.
//!
//! Which date changes are allowed depends on where the event currently sits
//! relative to `now`: upcoming events cannot be moved into the past, live
//! events cannot be backdated, past events cannot be moved into the future.
//! The caller injects `now` so the rules stay deterministic.

use chrono::Duration;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Lookahead window in which a start time counts as "soon" for reminders.
pub const REMINDER_WINDOW_HOURS: i64 = 24;

/// Start and end of an event or session, both absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateBounds {
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
}

impl DateBounds {
    pub fn new(starts_at: Option<Timestamp>, ends_at: Option<Timestamp>) -> Self {
        Self { starts_at, ends_at }
    }
}

/// Where stored bounds sit relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    /// No start yet, or the start is in the future.
    NotStarted,
    /// Started, and the end is still in the future.
    Live,
    /// Started, and either ended or has no end.
    Past,
}

impl EventPhase {
    pub fn classify(stored: &DateBounds, now: Timestamp) -> Self {
        match stored.starts_at {
            None => Self::NotStarted,
            Some(starts_at) if starts_at > now => Self::NotStarted,
            Some(_) => match stored.ends_at {
                Some(ends_at) if ends_at > now => Self::Live,
                _ => Self::Past,
            },
        }
    }
}

fn invalid(msg: &str) -> CoreError {
    CoreError::Validation(msg.to_string())
}

/// Ordering checks shared by events and sessions.
fn validate_ordering(entity: &str, new: &DateBounds) -> Result<(), CoreError> {
    match (new.starts_at, new.ends_at) {
        (None, Some(_)) => Err(CoreError::Validation(format!(
            "{entity} ends_at requires starts_at"
        ))),
        (Some(starts_at), Some(ends_at)) if ends_at < starts_at => Err(CoreError::Validation(
            format!("{entity} ends_at must not be before starts_at"),
        )),
        _ => Ok(()),
    }
}

/// Phase-dependent checks shared by events and sessions.
fn validate_phase_rules(
    entity: &str,
    phase: EventPhase,
    stored: &DateBounds,
    new: &DateBounds,
    now: Timestamp,
) -> Result<(), CoreError> {
    match phase {
        EventPhase::NotStarted => {
            if new.starts_at.is_some_and(|s| s < now) {
                return Err(CoreError::Validation(format!(
                    "{entity} starts_at cannot be in the past"
                )));
            }
            if new.ends_at.is_some_and(|e| e < now) {
                return Err(CoreError::Validation(format!(
                    "{entity} ends_at cannot be in the past"
                )));
            }
        }
        EventPhase::Live => match (stored.starts_at, new.starts_at) {
            (Some(current), Some(requested)) if requested < current => {
                return Err(CoreError::Validation(format!(
                    "{entity} is live: starts_at cannot be moved earlier"
                )));
            }
            (Some(_), None) => {
                return Err(CoreError::Validation(format!(
                    "{entity} is live: starts_at cannot be removed"
                )));
            }
            _ => {}
        },
        EventPhase::Past => {
            if new.starts_at.is_some_and(|s| s > now) {
                return Err(CoreError::Validation(format!(
                    "{entity} already happened: starts_at cannot be in the future"
                )));
            }
            if new.ends_at.is_some_and(|e| e > now) {
                return Err(CoreError::Validation(format!(
                    "{entity} already happened: ends_at cannot be in the future"
                )));
            }
        }
    }
    Ok(())
}

/// Validate new event bounds against the stored ones.
pub fn validate_event_dates(
    stored: &DateBounds,
    new: &DateBounds,
    now: Timestamp,
) -> Result<(), CoreError> {
    validate_ordering("event", new)?;
    let phase = EventPhase::classify(stored, now);
    validate_phase_rules("event", phase, stored, new, now)
}

/// Validate new session bounds.
///
/// `stored` is `None` for sessions being created by this update; those follow
/// the not-started rules unless the event itself already happened.
pub fn validate_session_dates(
    event_phase: EventPhase,
    event: &DateBounds,
    stored: Option<&DateBounds>,
    new: &DateBounds,
    now: Timestamp,
) -> Result<(), CoreError> {
    if new.starts_at.is_none() {
        return Err(invalid("session starts_at is required"));
    }
    validate_ordering("session", new)?;

    if let (Some(event_start), Some(session_start)) = (event.starts_at, new.starts_at) {
        if session_start < event_start {
            return Err(invalid("session starts_at must be within event bounds"));
        }
    }
    if let Some(event_end) = event.ends_at {
        if new.starts_at.is_some_and(|s| s > event_end) {
            return Err(invalid("session starts_at must be within event bounds"));
        }
        if new.ends_at.is_some_and(|e| e > event_end) {
            return Err(invalid("session ends_at must be within event bounds"));
        }
    }

    let empty = DateBounds::default();
    let (phase, stored) = match stored {
        Some(stored) => (EventPhase::classify(stored, now), stored),
        None if event_phase == EventPhase::Past => (EventPhase::Past, &empty),
        None => (EventPhase::NotStarted, &empty),
    };
    validate_phase_rules("session", phase, stored, new, now)
}

/// Validate a requested capacity.
///
/// `provider_max` is the configured participant limit of the meeting provider,
/// only relevant when a meeting is requested.
pub fn validate_capacity(
    capacity: Option<i32>,
    attendee_count: i64,
    meeting_requested: bool,
    provider_max: Option<i32>,
) -> Result<(), CoreError> {
    let Some(capacity) = capacity else {
        return Ok(());
    };
    if capacity < 0 {
        return Err(invalid("capacity must not be negative"));
    }
    if meeting_requested {
        if let Some(max) = provider_max {
            if capacity > max {
                return Err(CoreError::Validation(format!(
                    "capacity {capacity} exceeds the meeting provider maximum of {max} participants"
                )));
            }
        }
    }
    if i64::from(capacity) < attendee_count {
        return Err(CoreError::Validation(format!(
            "capacity {capacity} is below the current attendee count of {attendee_count}"
        )));
    }
    Ok(())
}

/// Whether a published event's start should be marked as evaluated for reminders.
///
/// True when the start falls inside the lookahead window and this exact start
/// has not been evaluated before.
pub fn reminder_due(
    published: bool,
    starts_at: Option<Timestamp>,
    evaluated_for: Option<Timestamp>,
    now: Timestamp,
) -> bool {
    let Some(starts_at) = starts_at else {
        return false;
    };
    published
        && starts_at > now
        && starts_at <= now + Duration::hours(REMINDER_WINDOW_HOURS)
        && evaluated_for != Some(starts_at)
}

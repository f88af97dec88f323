//! Repository for the `events` table and everything an event update replaces.

use std::collections::{HashMap, HashSet};

use ocg_core::cfs::SubmissionStatus;
use ocg_core::error::CoreError;
use ocg_core::meeting_sync::{
    is_event_meeting_in_sync, is_session_meeting_in_sync, next_meeting_in_sync, HostRef,
    SpeakerRef, StoredEventMeeting,
};
use ocg_core::schedule::{
    reminder_due, validate_capacity, validate_event_dates, validate_session_dates, DateBounds,
    EventPhase,
};
use ocg_core::timezone::{parse_timezone, resolve_in};
use ocg_core::types::DbId;
use sqlx::{FromRow, PgPool};

use crate::error::DbError;
use crate::models::event::{
    CreateEvent, Event, EventSpeaker, EventSponsor, EventSponsorInput, UpdateContext,
    UpdateEvent,
};
use crate::models::session::Session;
use crate::repositories::attendee_repo::AttendeeRepo;
use crate::repositories::cfs_label_repo::EventCfsLabelRepo;
use crate::repositories::session_repo::{SessionRepo, SessionWrite};

/// Column list for `events` queries.
const COLUMNS: &str = "id, group_id, name, description, kind_id, timezone, starts_at, ends_at, \
    capacity, published, canceled, deleted, meeting_requested, meeting_in_sync, \
    meeting_provider_id, meeting_hosts, event_reminder_evaluated_for_starts_at, \
    created_at, updated_at";

/// An active event locked for update, with its group's community.
#[derive(Debug, FromRow)]
struct LockedEvent {
    #[sqlx(flatten)]
    event: Event,
    community_id: DbId,
}

/// Provides operations on events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event. Schedule times are resolved in the event's timezone.
    ///
    /// Only ordering is enforced here (by the table check); events may be
    /// created in the past.
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, DbError> {
        let tz = parse_timezone(&input.timezone)?;
        let query = format!(
            "INSERT INTO events \
                (group_id, name, description, kind_id, timezone, starts_at, ends_at, \
                 capacity, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(input.group_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.kind_id)
            .bind(&input.timezone)
            .bind(input.starts_at.map(|l| resolve_in(&tz, l)))
            .bind(input.ends_at.map(|l| resolve_in(&tz, l)))
            .bind(input.capacity)
            .bind(input.published)
            .fetch_one(pool)
            .await?;

        tracing::info!(event_id = %event.id, group_id = %event.group_id, "Event created");
        Ok(event)
    }

    /// Find an event by ID, including canceled and deleted ones.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Cancel an event. Canceled events can no longer be updated.
    ///
    /// Returns `true` if an active event was canceled.
    pub async fn cancel(pool: &PgPool, group_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET canceled = true, updated_at = now() \
             WHERE id = $1 AND group_id = $2 AND canceled = false AND deleted = false",
        )
        .bind(id)
        .bind(group_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the user ids hosting an event.
    pub async fn list_host_ids(pool: &PgPool, event_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM event_hosts WHERE event_id = $1 ORDER BY user_id")
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// List an event's speakers.
    pub async fn list_speakers(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<EventSpeaker>, sqlx::Error> {
        sqlx::query_as::<_, EventSpeaker>(
            "SELECT user_id, featured FROM event_speakers WHERE event_id = $1 ORDER BY user_id",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    /// List an event's sponsors.
    pub async fn list_sponsors(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<EventSponsor>, sqlx::Error> {
        sqlx::query_as::<_, EventSponsor>(
            "SELECT group_sponsor_id, level FROM event_sponsors \
             WHERE event_id = $1 ORDER BY group_sponsor_id",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    /// Replace an event, its sessions, hosts, speakers, sponsors and
    /// (when present) CFS labels in one transaction.
    ///
    /// Every rule is checked before the first write. `meeting_in_sync` of the
    /// event and of each kept session is recomputed from the stored and
    /// incoming meeting-relevant fields; a `false` value is never reset here.
    pub async fn update(
        pool: &PgPool,
        group_id: DbId,
        event_id: DbId,
        input: &UpdateEvent,
        ctx: &UpdateContext<'_>,
    ) -> Result<(), DbError> {
        let now = ctx.now;
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {COLUMNS}, \
                    (SELECT g.community_id FROM groups g WHERE g.id = events.group_id) \
                        AS community_id \
             FROM events \
             WHERE id = $1 AND group_id = $2 AND canceled = false AND deleted = false \
               AND EXISTS (SELECT 1 FROM groups g WHERE g.id = $2 AND g.deleted = false) \
             FOR UPDATE"
        );
        let LockedEvent {
            event,
            community_id,
        } = sqlx::query_as::<_, LockedEvent>(&query)
            .bind(event_id)
            .bind(group_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "event",
                id: event_id,
            })?;

        // Dates
        let tz = parse_timezone(&input.timezone)?;
        let stored_bounds = DateBounds::new(event.starts_at, event.ends_at);
        let new_bounds = DateBounds::new(
            input.starts_at.map(|l| resolve_in(&tz, l)),
            input.ends_at.map(|l| resolve_in(&tz, l)),
        );
        validate_event_dates(&stored_bounds, &new_bounds, now)?;
        let event_phase = EventPhase::classify(&stored_bounds, now);

        // Sessions
        let stored_sessions = SessionRepo::lock_for_event(&mut tx, event_id).await?;
        let stored_by_id: HashMap<DbId, &Session> =
            stored_sessions.iter().map(|s| (s.id, s)).collect();

        let mut seen_sessions = HashSet::new();
        let mut session_writes = Vec::with_capacity(input.sessions.len());
        for session in &input.sessions {
            let stored = match session.id {
                Some(id) => {
                    if !seen_sessions.insert(id) {
                        return Err(CoreError::Validation(format!(
                            "session {id} appears more than once"
                        ))
                        .into());
                    }
                    let stored = stored_by_id.get(&id).copied().ok_or_else(|| {
                        CoreError::Validation(format!("session {id} does not belong to this event"))
                    })?;
                    Some(stored)
                }
                None => None,
            };

            let starts_at = resolve_in(&tz, session.starts_at);
            let ends_at = session.ends_at.map(|l| resolve_in(&tz, l));
            let bounds = DateBounds::new(Some(starts_at), ends_at);
            let stored_session_bounds =
                stored.map(|s| DateBounds::new(Some(s.starts_at), s.ends_at));
            validate_session_dates(
                event_phase,
                &new_bounds,
                stored_session_bounds.as_ref(),
                &bounds,
                now,
            )?;

            let meeting_in_sync = match stored {
                Some(stored) => {
                    let in_sync = is_session_meeting_in_sync(
                        &stored.stored_meeting(),
                        &session.meeting_input(&input.timezone),
                    )?;
                    tracing::debug!(session_id = %stored.id, in_sync, "Session meeting evaluated");
                    next_meeting_in_sync(stored.meeting_in_sync, in_sync)
                }
                None if session.meeting_requested.is_requested() => Some(false),
                None => None,
            };

            session_writes.push(SessionWrite {
                input: session,
                starts_at,
                ends_at,
                meeting_in_sync,
            });
        }

        // Capacity
        let attendee_count = AttendeeRepo::count_in_tx(&mut tx, event_id).await?;
        validate_capacity(
            input.capacity,
            attendee_count,
            input.meeting_requested.is_requested(),
            ctx.provider_max(input.meeting_provider_id.as_deref()),
        )?;

        // Referenced users, sponsors and linked submissions
        let user_ids = input.referenced_user_ids();
        if !user_ids.is_empty() {
            let found: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM users WHERE id = ANY($1) AND community_id = $2",
            )
            .bind(&user_ids)
            .bind(community_id)
            .fetch_one(&mut *tx)
            .await?;
            if found != user_ids.len() as i64 {
                return Err(CoreError::Validation(
                    "hosts and speakers must be users of the event's community".to_string(),
                )
                .into());
            }
        }

        let sponsor_ids = dedup_ids(input.sponsors.iter().map(|s| s.group_sponsor_id));
        if !sponsor_ids.is_empty() {
            let found: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM group_sponsors WHERE group_id = $1 AND id = ANY($2)",
            )
            .bind(group_id)
            .bind(&sponsor_ids)
            .fetch_one(&mut *tx)
            .await?;
            if found != sponsor_ids.len() as i64 {
                return Err(CoreError::Validation("invalid group sponsors".to_string()).into());
            }
        }

        let linked: Vec<DbId> = input
            .sessions
            .iter()
            .filter_map(|s| s.cfs_submission_id)
            .collect();
        let linked_ids = dedup_ids(linked.iter().copied());
        if linked_ids.len() != linked.len() {
            return Err(CoreError::Validation(
                "a CFS submission can only be linked to one session".to_string(),
            )
            .into());
        }
        if !linked_ids.is_empty() {
            // Shared locks held until commit: linked submissions stay approved.
            let approved: Vec<DbId> = sqlx::query_scalar(
                "SELECT id FROM cfs_submissions \
                 WHERE event_id = $1 AND id = ANY($2) AND status_id = $3 \
                 FOR SHARE",
            )
            .bind(event_id)
            .bind(&linked_ids)
            .bind(SubmissionStatus::Approved.as_str())
            .fetch_all(&mut *tx)
            .await?;
            if approved.len() != linked_ids.len() {
                return Err(CoreError::Validation(
                    "sessions can only be linked to approved submissions of this event"
                        .to_string(),
                )
                .into());
            }
        }

        // CFS labels
        let labels = match &input.cfs_labels {
            Some(labels) => {
                Some(EventCfsLabelRepo::validate_in_tx(&mut tx, event_id, labels).await?)
            }
            None => None,
        };

        // Event meeting
        let host_ids = Self::host_ids_in_tx(&mut tx, event_id).await?;
        let speakers = Self::speakers_in_tx(&mut tx, event_id).await?;
        let stored_meeting = StoredEventMeeting {
            name: event.name.clone(),
            kind_id: event.kind_id.clone(),
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            meeting_requested: event.meeting_requested,
            meeting_hosts: event.meeting_hosts.clone(),
            hosts: host_ids.into_iter().map(HostRef::Id).collect(),
            speakers: speakers
                .into_iter()
                .map(|s| SpeakerRef {
                    user_id: s.user_id,
                    featured: s.featured,
                })
                .collect(),
        };
        let in_sync = is_event_meeting_in_sync(&stored_meeting, &input.meeting_input())?;
        tracing::debug!(event_id = %event_id, in_sync, "Event meeting evaluated");
        let meeting_in_sync = next_meeting_in_sync(event.meeting_in_sync, in_sync);

        // Writes
        sqlx::query(
            "UPDATE events SET \
                name = $2, description = $3, kind_id = $4, timezone = $5, starts_at = $6, \
                ends_at = $7, capacity = $8, meeting_requested = $9, meeting_in_sync = $10, \
                meeting_provider_id = $11, meeting_hosts = $12, updated_at = now() \
             WHERE id = $1",
        )
        .bind(event_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.kind_id)
        .bind(&input.timezone)
        .bind(new_bounds.starts_at)
        .bind(new_bounds.ends_at)
        .bind(input.capacity)
        .bind(input.meeting_requested.is_requested())
        .bind(meeting_in_sync)
        .bind(&input.meeting_provider_id)
        .bind(&input.meeting_hosts)
        .execute(&mut *tx)
        .await?;

        Self::replace_hosts(&mut tx, event_id, &input.hosts).await?;
        Self::replace_speakers(&mut tx, event_id, &input.speakers).await?;
        Self::replace_sponsors(&mut tx, event_id, &input.sponsors).await?;

        if let Some(labels) = &labels {
            EventCfsLabelRepo::sync_in_tx(&mut tx, event_id, labels).await?;
        }

        let kept: Vec<DbId> = input.sessions.iter().filter_map(|s| s.id).collect();
        let deleted_sessions = SessionRepo::delete_omitted(&mut tx, event_id, &kept).await?;
        for write in &session_writes {
            SessionRepo::upsert(&mut tx, event_id, write).await?;
        }

        let reminder = reminder_due(
            event.published,
            new_bounds.starts_at,
            event.event_reminder_evaluated_for_starts_at,
            now,
        );
        if reminder {
            sqlx::query(
                "UPDATE events SET event_reminder_evaluated_for_starts_at = starts_at \
                 WHERE id = $1",
            )
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        if reminder {
            tracing::info!(
                event_id = %event_id,
                starts_at = ?new_bounds.starts_at,
                "Event reminder due"
            );
        }
        tracing::info!(
            event_id = %event_id,
            group_id = %group_id,
            sessions = session_writes.len(),
            deleted_sessions,
            meeting_in_sync = ?meeting_in_sync,
            "Event updated"
        );

        Ok(())
    }

    async fn host_ids_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM event_hosts WHERE event_id = $1")
            .bind(event_id)
            .fetch_all(&mut **tx)
            .await
    }

    async fn speakers_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: DbId,
    ) -> Result<Vec<EventSpeaker>, sqlx::Error> {
        sqlx::query_as::<_, EventSpeaker>(
            "SELECT user_id, featured FROM event_speakers WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_all(&mut **tx)
        .await
    }

    async fn replace_hosts(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: DbId,
        hosts: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM event_hosts WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query(
            "INSERT INTO event_hosts (event_id, user_id) \
             SELECT $1, UNNEST($2::uuid[]) \
             ON CONFLICT (event_id, user_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(hosts)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn replace_speakers(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: DbId,
        speakers: &[SpeakerRef],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM event_speakers WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;
        for speaker in speakers {
            sqlx::query(
                "INSERT INTO event_speakers (event_id, user_id, featured) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (event_id, user_id) DO UPDATE SET featured = EXCLUDED.featured",
            )
            .bind(event_id)
            .bind(speaker.user_id)
            .bind(speaker.featured)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn replace_sponsors(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: DbId,
        sponsors: &[EventSponsorInput],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM event_sponsors WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;
        for sponsor in sponsors {
            sqlx::query(
                "INSERT INTO event_sponsors (event_id, group_sponsor_id, level) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (event_id, group_sponsor_id) DO UPDATE SET level = EXCLUDED.level",
            )
            .bind(event_id)
            .bind(sponsor.group_sponsor_id)
            .bind(&sponsor.level)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

fn dedup_ids(ids: impl Iterator<Item = DbId>) -> Vec<DbId> {
    let mut ids: Vec<DbId> = ids.collect();
    ids.sort();
    ids.dedup();
    ids
}

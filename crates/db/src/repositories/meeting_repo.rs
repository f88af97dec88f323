//! Repository for the `meetings` table and the provisioning worker's queue.
//!
//! `meeting_in_sync = false` on an event or session marks work for the
//! provisioning worker. Only the worker flips it back to `true`, through
//! [`MeetingRepo::mark_event_synced`] and [`MeetingRepo::mark_session_synced`].

use ocg_core::types::DbId;
use sqlx::PgPool;

use crate::models::meeting::{CreateMeeting, Meeting, OutOfSyncMeeting};

/// Column list for `meetings` queries.
const COLUMNS: &str = "id, event_id, session_id, provider_id, provider_meeting_id, join_url, \
    password, created_at, updated_at";

/// Provides meeting records and sync-state transitions.
pub struct MeetingRepo;

impl MeetingRepo {
    /// Record a meeting created at the provider.
    pub async fn create(pool: &PgPool, input: &CreateMeeting) -> Result<Meeting, sqlx::Error> {
        let query = format!(
            "INSERT INTO meetings \
                (event_id, session_id, provider_id, provider_meeting_id, join_url, password) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let meeting = sqlx::query_as::<_, Meeting>(&query)
            .bind(input.event_id)
            .bind(input.session_id)
            .bind(&input.provider_id)
            .bind(&input.provider_meeting_id)
            .bind(&input.join_url)
            .bind(&input.password)
            .fetch_one(pool)
            .await?;

        tracing::info!(
            meeting_id = %meeting.id,
            provider_id = %meeting.provider_id,
            "Meeting recorded"
        );
        Ok(meeting)
    }

    /// Find a meeting by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Meeting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM meetings WHERE id = $1");
        sqlx::query_as::<_, Meeting>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Meetings whose event or session was deleted, awaiting cleanup at the provider.
    pub async fn list_orphaned(pool: &PgPool) -> Result<Vec<Meeting>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM meetings \
             WHERE event_id IS NULL AND session_id IS NULL \
             ORDER BY created_at"
        );
        sqlx::query_as::<_, Meeting>(&query).fetch_all(pool).await
    }

    /// Events and sessions of active events whose meeting needs the worker,
    /// least recently updated first.
    pub async fn list_out_of_sync(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<OutOfSyncMeeting>, sqlx::Error> {
        sqlx::query_as::<_, OutOfSyncMeeting>(
            "SELECT * FROM ( \
                SELECT 'event' AS entity, e.id, e.id AS event_id, e.meeting_requested, \
                       e.meeting_provider_id, e.updated_at \
                FROM events e \
                WHERE e.meeting_in_sync = false AND e.deleted = false \
                UNION ALL \
                SELECT 'session' AS entity, s.id, s.event_id, s.meeting_requested, \
                       s.meeting_provider_id, s.updated_at \
                FROM sessions s \
                JOIN events e ON e.id = s.event_id \
                WHERE s.meeting_in_sync = false AND e.deleted = false \
             ) pending \
             ORDER BY updated_at \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Mark an event's meeting as matching its current data.
    ///
    /// Returns `true` if the event was out of sync.
    pub async fn mark_event_synced(pool: &PgPool, event_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET meeting_in_sync = true \
             WHERE id = $1 AND meeting_in_sync = false",
        )
        .bind(event_id)
        .execute(pool)
        .await?;
        let updated = result.rows_affected() > 0;
        if updated {
            tracing::info!(event_id = %event_id, "Event meeting marked in sync");
        }
        Ok(updated)
    }

    /// Mark a session's meeting as matching its current data.
    ///
    /// Returns `true` if the session was out of sync.
    pub async fn mark_session_synced(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET meeting_in_sync = true \
             WHERE id = $1 AND meeting_in_sync = false",
        )
        .bind(session_id)
        .execute(pool)
        .await?;
        let updated = result.rows_affected() > 0;
        if updated {
            tracing::info!(session_id = %session_id, "Session meeting marked in sync");
        }
        Ok(updated)
    }
}

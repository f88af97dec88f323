//! Repository for the `sessions` and `session_speakers` tables.
//!
//! Sessions are only written as part of [`EventRepo::update`]; the write
//! helpers here take the enclosing transaction.
//!
//! [`EventRepo::update`]: crate::repositories::EventRepo::update

use ocg_core::meeting_sync::SpeakerRef;
use ocg_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::event::EventSpeaker;
use crate::models::session::{Session, UpdateSession};

/// Column list for `sessions` queries.
const COLUMNS: &str = "id, event_id, name, description, kind_id, starts_at, ends_at, location, \
    meeting_requested, meeting_in_sync, meeting_provider_id, meeting_hosts, \
    meeting_requires_password, cfs_submission_id, created_at, updated_at";

/// Resolved values of a session entry, ready to be written.
#[derive(Debug)]
pub(crate) struct SessionWrite<'a> {
    pub input: &'a UpdateSession,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub meeting_in_sync: Option<bool>,
}

/// Provides read access to sessions and transactional write helpers.
pub struct SessionRepo;

impl SessionRepo {
    /// List an event's sessions ordered by start time.
    pub async fn list_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions WHERE event_id = $1 ORDER BY starts_at, name"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// List a session's speakers.
    pub async fn list_speakers(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<EventSpeaker>, sqlx::Error> {
        sqlx::query_as::<_, EventSpeaker>(
            "SELECT user_id, featured FROM session_speakers \
             WHERE session_id = $1 ORDER BY user_id",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
    }

    /// Lock and return an event's sessions.
    pub(crate) async fn lock_for_event(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: DbId,
    ) -> Result<Vec<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE event_id = $1 FOR UPDATE");
        sqlx::query_as::<_, Session>(&query)
            .bind(event_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// Delete the event's sessions whose ids are not in `kept`.
    ///
    /// Meetings of deleted sessions are orphaned by the foreign key.
    pub(crate) async fn delete_omitted(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: DbId,
        kept: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE event_id = $1 AND NOT (id = ANY($2))")
                .bind(event_id)
                .bind(kept)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected())
    }

    /// Update the session with `write.input.id`, or insert a new one.
    ///
    /// Returns the session id.
    pub(crate) async fn upsert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: DbId,
        write: &SessionWrite<'_>,
    ) -> Result<DbId, sqlx::Error> {
        let input = write.input;
        let meeting_requested = input.meeting_requested.is_requested();
        let requires_password = input.meeting_requires_password.unwrap_or(false);

        let session_id = match input.id {
            Some(id) => {
                sqlx::query(
                    "UPDATE sessions SET \
                        name = $3, description = $4, kind_id = $5, starts_at = $6, \
                        ends_at = $7, location = $8, meeting_requested = $9, \
                        meeting_in_sync = $10, meeting_provider_id = $11, \
                        meeting_hosts = $12, meeting_requires_password = $13, \
                        cfs_submission_id = $14, updated_at = now() \
                     WHERE id = $1 AND event_id = $2",
                )
                .bind(id)
                .bind(event_id)
                .bind(&input.name)
                .bind(&input.description)
                .bind(&input.kind_id)
                .bind(write.starts_at)
                .bind(write.ends_at)
                .bind(&input.location)
                .bind(meeting_requested)
                .bind(write.meeting_in_sync)
                .bind(&input.meeting_provider_id)
                .bind(&input.meeting_hosts)
                .bind(requires_password)
                .bind(input.cfs_submission_id)
                .execute(&mut **tx)
                .await?;
                id
            }
            None => {
                sqlx::query_scalar(
                    "INSERT INTO sessions \
                        (event_id, name, description, kind_id, starts_at, ends_at, location, \
                         meeting_requested, meeting_in_sync, meeting_provider_id, \
                         meeting_hosts, meeting_requires_password, cfs_submission_id) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
                     RETURNING id",
                )
                .bind(event_id)
                .bind(&input.name)
                .bind(&input.description)
                .bind(&input.kind_id)
                .bind(write.starts_at)
                .bind(write.ends_at)
                .bind(&input.location)
                .bind(meeting_requested)
                .bind(write.meeting_in_sync)
                .bind(&input.meeting_provider_id)
                .bind(&input.meeting_hosts)
                .bind(requires_password)
                .bind(input.cfs_submission_id)
                .fetch_one(&mut **tx)
                .await?
            }
        };

        Self::replace_speakers(tx, session_id, &input.speakers).await?;
        Ok(session_id)
    }

    async fn replace_speakers(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        session_id: DbId,
        speakers: &[SpeakerRef],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM session_speakers WHERE session_id = $1")
            .bind(session_id)
            .execute(&mut **tx)
            .await?;
        for speaker in speakers {
            sqlx::query(
                "INSERT INTO session_speakers (session_id, user_id, featured) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (session_id, user_id) DO UPDATE SET featured = EXCLUDED.featured",
            )
            .bind(session_id)
            .bind(speaker.user_id)
            .bind(speaker.featured)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

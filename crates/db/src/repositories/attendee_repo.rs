//! Repository for the `event_attendees` table.

use ocg_core::types::DbId;
use sqlx::PgPool;

/// Provides attendance operations used by capacity checks.
pub struct AttendeeRepo;

impl AttendeeRepo {
    /// Register a user for an event. Idempotent.
    ///
    /// Returns `true` if a new registration was created.
    pub async fn add(pool: &PgPool, event_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO event_attendees (event_id, user_id) \
             VALUES ($1, $2) \
             ON CONFLICT (event_id, user_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count an event's attendees inside an open transaction.
    pub(crate) async fn count_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM event_attendees WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&mut **tx)
            .await
    }
}

//! Repository for the `event_cfs_labels` table.

use std::collections::HashSet;

use ocg_core::cfs::{ensure_unique_label_names, validate_label_name};
use ocg_core::error::CoreError;
use ocg_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::event::{CfsLabelInput, EventCfsLabel};

/// Column list for `event_cfs_labels` queries.
const COLUMNS: &str = "id, event_id, name, color, created_at, updated_at";

/// Labels after validation, ready to be written.
#[derive(Debug)]
pub(crate) struct ValidatedLabel {
    pub id: Option<DbId>,
    pub name: String,
    pub color: String,
}

/// Provides operations on the labels reviewers attach to submissions.
pub struct EventCfsLabelRepo;

impl EventCfsLabelRepo {
    /// Insert a single label for an event.
    pub async fn create(
        pool: &PgPool,
        event_id: DbId,
        name: &str,
        color: &str,
    ) -> Result<EventCfsLabel, DbError> {
        let name = validate_label_name(name)?;
        let query = format!(
            "INSERT INTO event_cfs_labels (event_id, name, color) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let label = sqlx::query_as::<_, EventCfsLabel>(&query)
            .bind(event_id)
            .bind(&name)
            .bind(color)
            .fetch_one(pool)
            .await?;
        Ok(label)
    }

    /// List an event's labels ordered by name.
    pub async fn list_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<EventCfsLabel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM event_cfs_labels WHERE event_id = $1 ORDER BY name"
        );
        sqlx::query_as::<_, EventCfsLabel>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Validate a replacement label set against the event's stored labels.
    ///
    /// Names are trimmed and must be unique; ids must appear once and belong
    /// to `event_id`.
    pub(crate) async fn validate_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: DbId,
        labels: &[CfsLabelInput],
    ) -> Result<Vec<ValidatedLabel>, DbError> {
        let validated = labels
            .iter()
            .map(|l| {
                Ok(ValidatedLabel {
                    id: l.id,
                    name: validate_label_name(&l.name)?,
                    color: l.color.trim().to_string(),
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        ensure_unique_label_names(validated.iter().map(|l| l.name.as_str()))?;

        let mut ids = Vec::new();
        let mut seen = HashSet::new();
        for id in validated.iter().filter_map(|l| l.id) {
            if !seen.insert(id) {
                return Err(CoreError::Validation(format!(
                    "CFS label {id} appears more than once"
                ))
                .into());
            }
            ids.push(id);
        }
        if !ids.is_empty() {
            let found: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM event_cfs_labels WHERE event_id = $1 AND id = ANY($2)",
            )
            .bind(event_id)
            .bind(&ids)
            .fetch_one(&mut **tx)
            .await?;
            if found != ids.len() as i64 {
                return Err(CoreError::Validation("invalid event CFS labels".to_string()).into());
            }
        }
        Ok(validated)
    }

    /// Replace the event's labels with `labels`.
    ///
    /// Labels missing from the set are deleted first (cascading to submission
    /// assignments) so renames into a freed name do not collide.
    pub(crate) async fn sync_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: DbId,
        labels: &[ValidatedLabel],
    ) -> Result<(), sqlx::Error> {
        let kept: Vec<DbId> = labels.iter().filter_map(|l| l.id).collect();
        sqlx::query("DELETE FROM event_cfs_labels WHERE event_id = $1 AND NOT (id = ANY($2))")
            .bind(event_id)
            .bind(&kept)
            .execute(&mut **tx)
            .await?;

        for label in labels {
            match label.id {
                Some(id) => {
                    sqlx::query(
                        "UPDATE event_cfs_labels SET name = $3, color = $4, updated_at = now() \
                         WHERE id = $1 AND event_id = $2",
                    )
                    .bind(id)
                    .bind(event_id)
                    .bind(&label.name)
                    .bind(&label.color)
                    .execute(&mut **tx)
                    .await?;
                }
                None => {
                    sqlx::query(
                        "INSERT INTO event_cfs_labels (event_id, name, color) VALUES ($1, $2, $3)",
                    )
                    .bind(event_id)
                    .bind(&label.name)
                    .bind(&label.color)
                    .execute(&mut **tx)
                    .await?;
                }
            }
        }
        Ok(())
    }
}

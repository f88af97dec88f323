//! Repository for the `communities`, `groups` and `group_sponsors` tables.

use ocg_core::types::DbId;
use sqlx::PgPool;

use crate::models::community::{
    Community, CreateCommunity, CreateGroup, CreateGroupSponsor, Group, GroupSponsor,
};

/// Column list for `communities` queries.
const COMMUNITY_COLUMNS: &str = "id, name, display_name, created_at, updated_at";

/// Column list for `groups` queries.
const GROUP_COLUMNS: &str = "id, community_id, name, active, deleted, created_at, updated_at";

/// Column list for `group_sponsors` queries.
const SPONSOR_COLUMNS: &str =
    "id, group_id, name, logo_url, website_url, created_at, updated_at";

/// Provides create and lookup operations for communities.
pub struct CommunityRepo;

impl CommunityRepo {
    /// Insert a new community, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCommunity) -> Result<Community, sqlx::Error> {
        let query = format!(
            "INSERT INTO communities (name, display_name) \
             VALUES ($1, $2) \
             RETURNING {COMMUNITY_COLUMNS}"
        );
        sqlx::query_as::<_, Community>(&query)
            .bind(&input.name)
            .bind(&input.display_name)
            .fetch_one(pool)
            .await
    }

    /// Find a community by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Community>, sqlx::Error> {
        let query = format!("SELECT {COMMUNITY_COLUMNS} FROM communities WHERE id = $1");
        sqlx::query_as::<_, Community>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Provides create and lookup operations for groups.
pub struct GroupRepo;

impl GroupRepo {
    /// Insert a new active group, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateGroup) -> Result<Group, sqlx::Error> {
        let query = format!(
            "INSERT INTO groups (community_id, name) \
             VALUES ($1, $2) \
             RETURNING {GROUP_COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(input.community_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a group by its ID, including deleted ones.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Group>, sqlx::Error> {
        let query = format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1");
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Provides create and list operations for group sponsors.
pub struct GroupSponsorRepo;

impl GroupSponsorRepo {
    /// Insert a new sponsor for a group, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGroupSponsor,
    ) -> Result<GroupSponsor, sqlx::Error> {
        let query = format!(
            "INSERT INTO group_sponsors (group_id, name, logo_url, website_url) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {SPONSOR_COLUMNS}"
        );
        sqlx::query_as::<_, GroupSponsor>(&query)
            .bind(input.group_id)
            .bind(&input.name)
            .bind(&input.logo_url)
            .bind(&input.website_url)
            .fetch_one(pool)
            .await
    }

    /// List a group's sponsors ordered by name.
    pub async fn list_for_group(
        pool: &PgPool,
        group_id: DbId,
    ) -> Result<Vec<GroupSponsor>, sqlx::Error> {
        let query = format!(
            "SELECT {SPONSOR_COLUMNS} FROM group_sponsors WHERE group_id = $1 ORDER BY name"
        );
        sqlx::query_as::<_, GroupSponsor>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }
}

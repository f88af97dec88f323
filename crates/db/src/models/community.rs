//! Community, group, sponsor and user models.
//!
//! These entities are managed elsewhere; only the fields the review and
//! event update operations depend on are modelled here.

use ocg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `communities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Community {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a community.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommunity {
    pub name: String,
    pub display_name: String,
}

/// A row from the `groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub id: DbId,
    pub community_id: DbId,
    pub name: String,
    pub active: bool,
    pub deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a group.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroup {
    pub community_id: DbId,
    pub name: String,
}

/// A row from the `group_sponsors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupSponsor {
    pub id: DbId,
    pub group_id: DbId,
    pub name: String,
    pub logo_url: String,
    pub website_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a group sponsor.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupSponsor {
    pub group_id: DbId,
    pub name: String,
    pub logo_url: String,
    pub website_url: Option<String>,
}

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub community_id: DbId,
    pub username: String,
    pub name: Option<String>,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub community_id: DbId,
    pub username: String,
    pub name: Option<String>,
    pub email: String,
}

//! Shared fixtures for the database integration tests.

#![allow(dead_code)]

use chrono::{Duration, NaiveDateTime, TimeZone, Utc};
use ocg_core::meeting_sync::MeetingRequested;
use ocg_core::types::{DbId, Timestamp};
use ocg_db::models::community::{CreateCommunity, CreateGroup, CreateUser};
use ocg_db::models::event::{CreateEvent, Event, UpdateContext, UpdateEvent};
use ocg_db::models::session::UpdateSession;
use ocg_db::repositories::{CommunityRepo, EventRepo, GroupRepo, UserRepo};
use sqlx::PgPool;

/// Fixed clock used by every update in the tests.
pub fn now() -> Timestamp {
    Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
}

/// Wall-clock UTC time `h` hours from [`now`].
pub fn at(h: i64) -> NaiveDateTime {
    (now() + Duration::hours(h)).naive_utc()
}

/// Absolute time `h` hours from [`now`].
pub fn abs(h: i64) -> Timestamp {
    now() + Duration::hours(h)
}

pub fn ctx() -> UpdateContext<'static> {
    UpdateContext::new(now())
}

pub struct Community {
    pub community_id: DbId,
    pub group_id: DbId,
    pub users: Vec<DbId>,
}

/// A community with one group and three users.
pub async fn seed_community(pool: &PgPool, name: &str) -> Community {
    let community = CommunityRepo::create(
        pool,
        &CreateCommunity {
            name: name.to_string(),
            display_name: name.to_uppercase(),
        },
    )
    .await
    .unwrap();
    let group = GroupRepo::create(
        pool,
        &CreateGroup {
            community_id: community.id,
            name: format!("{name} group"),
        },
    )
    .await
    .unwrap();

    let mut users = Vec::new();
    for i in 0..3 {
        let user = UserRepo::create(
            pool,
            &CreateUser {
                community_id: community.id,
                username: format!("{name}-user-{i}"),
                name: None,
                email: format!("{name}-user-{i}@example.com"),
            },
        )
        .await
        .unwrap();
        users.push(user.id);
    }

    Community {
        community_id: community.id,
        group_id: group.id,
        users,
    }
}

/// An unpublished virtual event in UTC spanning `start..end` hours from now.
pub async fn seed_event(pool: &PgPool, group_id: DbId, start: i64, end: i64) -> Event {
    EventRepo::create(
        pool,
        &CreateEvent {
            group_id,
            name: "Rust meetup".to_string(),
            description: "Monthly meetup".to_string(),
            kind_id: "virtual".to_string(),
            timezone: "UTC".to_string(),
            starts_at: Some(at(start)),
            ends_at: Some(at(end)),
            capacity: None,
            published: false,
        },
    )
    .await
    .unwrap()
}

/// An update payload that keeps every stored field of `event` as is.
pub fn unchanged(event: &Event) -> UpdateEvent {
    UpdateEvent {
        name: event.name.clone(),
        description: event.description.clone(),
        kind_id: event.kind_id.clone(),
        timezone: event.timezone.clone(),
        starts_at: event.starts_at.map(|t| t.naive_utc()),
        ends_at: event.ends_at.map(|t| t.naive_utc()),
        capacity: event.capacity,
        meeting_requested: MeetingRequested::from(event.meeting_requested),
        meeting_provider_id: event.meeting_provider_id.clone(),
        meeting_hosts: event.meeting_hosts.clone(),
        hosts: Vec::new(),
        speakers: Vec::new(),
        sponsors: Vec::new(),
        sessions: Vec::new(),
        cfs_labels: None,
    }
}

/// A new virtual session entry spanning `start..end` hours from now.
pub fn new_session(name: &str, start: i64, end: i64) -> UpdateSession {
    UpdateSession {
        id: None,
        name: name.to_string(),
        description: None,
        kind_id: "virtual".to_string(),
        starts_at: at(start),
        ends_at: Some(at(end)),
        location: None,
        meeting_requested: MeetingRequested::Absent,
        meeting_provider_id: None,
        meeting_hosts: None,
        meeting_requires_password: None,
        speakers: Vec::new(),
        cfs_submission_id: None,
    }
}

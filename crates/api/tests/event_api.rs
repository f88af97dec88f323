//! Integration tests for `PUT /api/v1/groups/{group_id}/events/{event_id}`
//! and the CFS review endpoints.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{body_json, build_test_app, get_auth, seed, send_json, token_for};
use ocg_core::types::DbId;
use ocg_db::models::cfs_submission::{CreateCfsSubmission, CreateSessionProposal};
use ocg_db::models::event::{CreateEvent, Event};
use ocg_db::repositories::{CfsSubmissionRepo, EventRepo, SessionProposalRepo, SessionRepo};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Wall-clock UTC string `days` days from now, at whole seconds.
fn days_from_now(days: i64) -> String {
    (Utc::now() + Duration::days(days))
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

async fn seed_event(pool: &PgPool, group_id: DbId) -> Event {
    let starts_at = Utc::now() + Duration::days(30);
    EventRepo::create(
        pool,
        &CreateEvent {
            group_id,
            name: "Rust meetup".to_string(),
            description: String::new(),
            kind_id: "virtual".to_string(),
            timezone: "UTC".to_string(),
            starts_at: Some(starts_at.naive_utc()),
            ends_at: Some((starts_at + Duration::hours(2)).naive_utc()),
            capacity: None,
            published: true,
        },
    )
    .await
    .unwrap()
}

fn event_body(name: &str, hosts: &[DbId]) -> serde_json::Value {
    json!({
        "name": name,
        "kind_id": "virtual",
        "timezone": "UTC",
        "starts_at": days_from_now(30),
        "ends_at": days_from_now(31),
        "hosts": hosts,
    })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_event_returns_204_and_persists(pool: PgPool) {
    let s = seed(&pool).await;
    let event = seed_event(&pool, s.group_id).await;
    let token = token_for(s.users[0]);
    let uri = format!("/api/v1/groups/{}/events/{}", s.group_id, event.id);

    let mut body = event_body("Rust meetup: async", &[s.users[0]]);
    body["sessions"] = json!([{
        "name": "Lightning talks",
        "kind_id": "virtual",
        "starts_at": days_from_now(30),
    }]);
    let app = build_test_app(pool.clone());
    let response = send_json(app, Method::PUT, &uri, Some(&token), body).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let stored = EventRepo::find_by_id(&pool, event.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Rust meetup: async");
    assert_eq!(EventRepo::list_host_ids(&pool, event.id).await.unwrap(), vec![s.users[0]]);
    assert_eq!(SessionRepo::list_for_event(&pool, event.id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_event_requires_authentication(pool: PgPool) {
    let s = seed(&pool).await;
    let event = seed_event(&pool, s.group_id).await;
    let uri = format!("/api/v1/groups/{}/events/{}", s.group_id, event.id);

    let body = event_body("x", &[]);
    let response = send_json(build_test_app(pool), Method::PUT, &uri, None, body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_event_in_another_group_is_not_found(pool: PgPool) {
    let s = seed(&pool).await;
    let event = seed_event(&pool, s.group_id).await;
    let token = token_for(s.users[0]);
    let uri = format!("/api/v1/groups/{}/events/{}", Uuid::new_v4(), event.id);

    let body = event_body("x", &[]);
    let response = send_json(build_test_app(pool), Method::PUT, &uri, Some(&token), body).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn capacity_above_provider_limit_is_rejected(pool: PgPool) {
    let s = seed(&pool).await;
    let event = seed_event(&pool, s.group_id).await;
    let token = token_for(s.users[0]);
    let uri = format!("/api/v1/groups/{}/events/{}", s.group_id, event.id);

    let mut body = event_body("Rust meetup", &[]);
    body["capacity"] = json!(150);
    body["meeting_requested"] = json!(true);
    body["meeting_provider_id"] = json!("zoom");
    let response = send_json(build_test_app(pool), Method::PUT, &uri, Some(&token), body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_in_the_past_is_rejected(pool: PgPool) {
    let s = seed(&pool).await;
    let event = seed_event(&pool, s.group_id).await;
    let token = token_for(s.users[0]);
    let uri = format!("/api/v1/groups/{}/events/{}", s.group_id, event.id);

    let mut body = event_body("Rust meetup", &[]);
    body["starts_at"] = json!(days_from_now(-1));
    let response = send_json(build_test_app(pool), Method::PUT, &uri, Some(&token), body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reviewing_a_submission_reports_notification(pool: PgPool) {
    let s = seed(&pool).await;
    let event = seed_event(&pool, s.group_id).await;
    let proposal = SessionProposalRepo::create(
        &pool,
        &CreateSessionProposal {
            user_id: s.users[1],
            title: "Lifetimes without tears".to_string(),
            description: "Borrowing explained".to_string(),
            session_kind_id: "virtual".to_string(),
            duration_minutes: 45,
        },
    )
    .await
    .unwrap();
    let submission = CfsSubmissionRepo::create(
        &pool,
        &CreateCfsSubmission {
            event_id: event.id,
            session_proposal_id: proposal.id,
        },
    )
    .await
    .unwrap();
    let token = token_for(s.users[0]);
    let uri = format!("/api/v1/events/{}/submissions/{}", event.id, submission.id);

    let response = send_json(
        build_test_app(pool.clone()),
        Method::PUT,
        &uri,
        Some(&token),
        json!({ "status_id": "approved", "rating_stars": 4 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["notify_speaker"], true);

    let response = get_auth(build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status_id"], "approved");

    let response = get_auth(build_test_app(pool.clone()), &format!("{uri}/ratings"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["stars"], 4);
    assert_eq!(json["data"][0]["reviewer_id"], s.users[0].to_string());

    let response = send_json(
        build_test_app(pool),
        Method::PUT,
        &uri,
        Some(&token),
        json!({ "status_id": "approved" }),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["notify_speaker"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_submission_is_not_found(pool: PgPool) {
    let s = seed(&pool).await;
    let event = seed_event(&pool, s.group_id).await;
    let token = token_for(s.users[0]);
    let uri = format!("/api/v1/events/{}/submissions/{}", event.id, Uuid::new_v4());

    let response = get_auth(build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send_json(
        build_test_app(pool),
        Method::PUT,
        &uri,
        Some(&token),
        json!({ "status_id": "rejected" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

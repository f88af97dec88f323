//! Shared helpers for the API integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use ocg_api::auth::jwt::{generate_access_token, JwtConfig};
use ocg_api::config::{MeetingsConfig, ServerConfig};
use ocg_api::router::build_app_router;
use ocg_api::state::AppState;
use ocg_core::types::DbId;
use ocg_db::models::community::{CreateCommunity, CreateGroup, CreateUser};
use sqlx::PgPool;
use tower::ServiceExt;

const TEST_SECRET: &str = "test-secret-used-only-in-integration-tests";

pub fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        access_token_expiry_mins: 5,
    }
}

/// Build a test `ServerConfig` with safe defaults and a Zoom limit of 100.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: test_jwt(),
        meetings: MeetingsConfig {
            max_participants: HashMap::from([("zoom".to_string(), 100)]),
        },
    }
}

/// Build the full application router, middleware included, on `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// A valid bearer token for `user_id`.
pub fn token_for(user_id: DbId) -> String {
    generate_access_token(user_id, &test_jwt()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a JSON body with `method`, optionally authenticated.
pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub struct Seeded {
    pub group_id: DbId,
    pub users: Vec<DbId>,
}

/// One community with a group and two users.
pub async fn seed(pool: &PgPool) -> Seeded {
    let community = ocg_db::repositories::CommunityRepo::create(
        pool,
        &CreateCommunity {
            name: "rustaceans".to_string(),
            display_name: "Rustaceans".to_string(),
        },
    )
    .await
    .unwrap();
    let group = ocg_db::repositories::GroupRepo::create(
        pool,
        &CreateGroup {
            community_id: community.id,
            name: "Rust Madrid".to_string(),
        },
    )
    .await
    .unwrap();

    let mut users = Vec::new();
    for name in ["ana", "bo"] {
        let user = ocg_db::repositories::UserRepo::create(
            pool,
            &CreateUser {
                community_id: community.id,
                username: name.to_string(),
                name: None,
                email: format!("{name}@example.com"),
            },
        )
        .await
        .unwrap();
        users.push(user.id);
    }

    Seeded {
        group_id: group.id,
        users,
    }
}

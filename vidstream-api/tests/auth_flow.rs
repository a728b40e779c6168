/// End-to-end tests for the authentication lifecycle
///
/// Drives the full router (middleware stack included) over the in-memory
/// credential store: registration, login, cookie transport, token rotation,
/// logout, password change, and the protected read models.
mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{body_json, set_cookies, TestContext};
use serde_json::json;
use vidstream_shared::store::memory::VideoRecord;

#[tokio::test]
async fn test_register_login_and_protected_access() {
    let ctx = TestContext::new();

    // Register
    let body = ctx.register("alice").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("password_hash").is_none());
    assert!(body["data"].get("refreshToken").is_none());

    // Same username again
    let response = ctx
        .post_json(
            "/api/v1/users/register",
            json!({
                "username": "alice",
                "email": "alice2@example.com",
                "fullName": "Alice",
                "password": "p1",
                "avatarUrl": "https://cdn.example.com/alice2.png",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 409);

    // Wrong password
    let response = ctx
        .post_json(
            "/api/v1/users/login",
            json!({"username": "alice", "password": "wrong"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Correct password
    let session = ctx.login("alice", "p1").await;
    let access = session["accessToken"].as_str().unwrap();
    let refresh = session["refreshToken"].as_str().unwrap();
    assert!(!access.is_empty());
    assert!(!refresh.is_empty());
    assert_eq!(session["user"]["username"], "alice");

    // Protected endpoint without a token
    let response = ctx
        .send(
            Request::builder()
                .method("GET")
                .uri("/api/v1/users/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // And with it
    let response = ctx.get_auth("/api/v1/users/me", access).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "alice");
}

#[tokio::test]
async fn test_register_validation_failures() {
    let ctx = TestContext::new();

    // Blank password
    let response = ctx
        .post_json(
            "/api/v1/users/register",
            json!({
                "username": "bob",
                "email": "bob@example.com",
                "fullName": "Bob",
                "password": "   ",
                "avatarUrl": "https://cdn.example.com/bob.png",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Malformed email
    let response = ctx
        .post_json(
            "/api/v1/users/register",
            json!({
                "username": "bob",
                "email": "not-an-email",
                "fullName": "Bob",
                "password": "p1",
                "avatarUrl": "https://cdn.example.com/bob.png",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    // Missing avatar; the cover image stays optional
    let response = ctx
        .post_json(
            "/api/v1/users/register",
            json!({
                "username": "bob",
                "email": "bob@example.com",
                "fullName": "Bob",
                "password": "p1",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("avatar_url"));
}

#[tokio::test]
async fn test_login_failures() {
    let ctx = TestContext::new();
    ctx.register("alice").await;

    // Unknown user
    let response = ctx
        .post_json(
            "/api/v1/users/login",
            json!({"username": "nobody", "password": "p1"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // No identifier at all
    let response = ctx
        .post_json("/api/v1/users/login", json!({"password": "p1"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Email works as the identifier
    let response = ctx
        .post_json(
            "/api/v1/users/login",
            json!({"email": "alice@example.com", "password": "p1"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_sets_http_only_cookies() {
    let ctx = TestContext::new();
    ctx.register("alice").await;

    let response = ctx
        .post_json(
            "/api/v1/users/login",
            json!({"username": "alice", "password": "p1"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies[0].starts_with("accessToken="));
    assert!(cookies[1].starts_with("refreshToken="));
    for cookie in cookies {
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
    }
}

#[tokio::test]
async fn test_access_token_works_via_cookie() {
    let ctx = TestContext::new();
    ctx.register("alice").await;
    let session = ctx.login("alice", "p1").await;
    let access = session["accessToken"].as_str().unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/users/me")
        .header("cookie", format!("accessToken={access}"))
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rotation_is_single_use() {
    let ctx = TestContext::new();
    ctx.register("alice").await;
    let session = ctx.login("alice", "p1").await;
    let first_refresh = session["refreshToken"].as_str().unwrap().to_string();

    // First exchange succeeds, via the JSON body
    let response = ctx
        .post_json(
            "/api/v1/users/refresh-token",
            json!({"refreshToken": first_refresh}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await["data"]["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(rotated, first_refresh);

    // Replaying the consumed token fails
    let response = ctx
        .post_json(
            "/api/v1/users/refresh-token",
            json!({"refreshToken": first_refresh}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The rotated token is still live
    let response = ctx
        .post_json(
            "/api/v1/users/refresh-token",
            json!({"refreshToken": rotated}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_via_cookie() {
    let ctx = TestContext::new();
    ctx.register("alice").await;
    let session = ctx.login("alice", "p1").await;
    let refresh = session["refreshToken"].as_str().unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/refresh-token")
        .header("cookie", format!("refreshToken={refresh}"))
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    // New cookies delivered with the rotated pair
    assert_eq!(set_cookies(&response).len(), 2);
}

#[tokio::test]
async fn test_refresh_without_any_token() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/refresh-token")
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let ctx = TestContext::new();
    ctx.register("alice").await;
    let session = ctx.login("alice", "p1").await;
    let access = session["accessToken"].as_str().unwrap();
    let refresh = session["refreshToken"].as_str().unwrap();

    let response = ctx
        .post_json_auth("/api/v1/users/logout", json!({}), access)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Cookies instructed to expire
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    for cookie in &cookies {
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970"));
    }

    // Logging out twice is not an error
    let response = ctx
        .post_json_auth("/api/v1/users/logout", json!({}), access)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The pre-logout refresh token is dead
    let response = ctx
        .post_json(
            "/api/v1/users/refresh-token",
            json!({"refreshToken": refresh}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_flow() {
    let ctx = TestContext::new();
    ctx.register("alice").await;
    let session = ctx.login("alice", "p1").await;
    let access = session["accessToken"].as_str().unwrap();

    // Wrong old password
    let response = ctx
        .post_json_auth(
            "/api/v1/users/change-password",
            json!({"oldPassword": "wrong", "newPassword": "p2"}),
            access,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Correct old password
    let response = ctx
        .post_json_auth(
            "/api/v1/users/change-password",
            json!({"oldPassword": "p1", "newPassword": "p2"}),
            access,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Old credential no longer works, new one does
    let response = ctx
        .post_json(
            "/api/v1/users/login",
            json!({"username": "alice", "password": "p1"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.login("alice", "p2").await;
}

#[tokio::test]
async fn test_expired_access_token_is_rejected() {
    // Access tokens minted already expired, well past the verifier's leeway
    let ctx = TestContext::with_config(common::test_config(-60));
    ctx.register("alice").await;
    let session = ctx.login("alice", "p1").await;
    let access = session["accessToken"].as_str().unwrap();

    let response = ctx.get_auth("/api/v1/users/me", access).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_foreign_token_is_rejected() {
    // A token signed by a different deployment's secrets
    let ctx = TestContext::new();
    ctx.register("alice").await;

    let mut foreign_config = common::test_config(15);
    foreign_config.auth.access_secret = "another-access-secret-0123456789abcdef".to_string();
    foreign_config.auth.refresh_secret = "another-refresh-secret-0123456789abcde".to_string();
    let foreign = TestContext::with_config(foreign_config);
    foreign.register("alice").await;
    let session = foreign.login("alice", "p1").await;
    let access = session["accessToken"].as_str().unwrap();

    let response = ctx.get_auth("/api/v1/users/me", access).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_channel_profile_read_model() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice").await;
    let bob = ctx.register("bob").await;
    let alice_id = alice["data"]["id"].as_str().unwrap().parse().unwrap();
    let bob_id = bob["data"]["id"].as_str().unwrap().parse().unwrap();

    ctx.store.add_subscription(alice_id, bob_id).await;

    let session = ctx.login("alice", "p1").await;
    let access = session["accessToken"].as_str().unwrap();

    let response = ctx.get_auth("/api/v1/channels/bob", access).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "bob");
    assert_eq!(body["data"]["subscriberCount"], 1);
    assert_eq!(body["data"]["subscribedToCount"], 0);
    assert_eq!(body["data"]["isSubscribed"], true);

    // Unknown channel
    let response = ctx.get_auth("/api/v1/channels/nobody", access).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // No credential
    let response = ctx
        .send(
            Request::builder()
                .method("GET")
                .uri("/api/v1/channels/bob")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_watch_history_read_model() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice").await;
    let bob = ctx.register("bob").await;
    let alice_id = alice["data"]["id"].as_str().unwrap().parse().unwrap();
    let bob_id = bob["data"]["id"].as_str().unwrap().parse().unwrap();

    let video_id = uuid::Uuid::new_v4();
    ctx.store
        .add_video(VideoRecord {
            id: video_id,
            owner_id: bob_id,
            title: "Cooking with Bob".to_string(),
            thumbnail_url: None,
        })
        .await;
    ctx.store.add_watch(alice_id, video_id).await;

    let session = ctx.login("alice", "p1").await;
    let access = session["accessToken"].as_str().unwrap();

    let response = ctx.get_auth("/api/v1/users/history", access).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let history = body["data"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["title"], "Cooking with Bob");
    assert_eq!(history[0]["ownerName"], "bob");
}

#[tokio::test]
async fn test_health_endpoint() {
    let ctx = TestContext::new();

    let response = ctx
        .send(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "connected");
}

/// Shared test harness
///
/// Builds the full router over the in-memory credential store, so the
/// integration suite exercises the real middleware stack, handlers, and
/// session manager without external services.
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use serde_json::Value;
use tower::ServiceExt as _;
use vidstream_api::{
    app::{build_router, AppState},
    config::{ApiConfig, AuthConfig, Config, DatabaseConfig},
};
use vidstream_shared::store::{memory::MemoryUserStore, UserStore};

/// Test application context
pub struct TestContext {
    /// The router under test
    pub app: Router,

    /// Direct handle to the backing store, for seeding read-model data
    pub store: Arc<MemoryUserStore>,
}

/// Config with valid secrets and the given access-token lifetime
pub fn test_config(access_ttl_minutes: i64) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "unused-in-tests".to_string(),
            max_connections: 1,
        },
        auth: AuthConfig {
            access_secret: "integration-access-secret-0123456789ab".to_string(),
            refresh_secret: "integration-refresh-secret-0123456789a".to_string(),
            access_ttl_minutes,
            refresh_ttl_days: 7,
        },
    }
}

impl TestContext {
    /// Context with a fresh store and 15-minute access tokens
    pub fn new() -> Self {
        Self::with_config(test_config(15))
    }

    /// Context with custom configuration (e.g. already-expired tokens)
    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryUserStore::new());
        let state = AppState::new(store.clone() as Arc<dyn UserStore>, config)
            .expect("test config should validate");

        Self {
            app: build_router(state),
            store,
        }
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<axum::body::Body> {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("request should not fail at the service level")
    }

    /// POSTs a JSON body
    pub async fn post_json(&self, path: &str, body: Value) -> Response<axum::body::Body> {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// POSTs a JSON body with a bearer access token
    pub async fn post_json_auth(
        &self,
        path: &str,
        body: Value,
        token: &str,
    ) -> Response<axum::body::Body> {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// GETs with a bearer access token
    pub async fn get_auth(&self, path: &str, token: &str) -> Response<axum::body::Body> {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Registers a user through the API; password is `"p1"`
    pub async fn register(&self, username: &str) -> Value {
        let response = self
            .post_json(
                "/api/v1/users/register",
                serde_json::json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "fullName": username,
                    "password": "p1",
                    "avatarUrl": format!("https://cdn.example.com/{username}.png"),
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201, "registration should succeed");
        body_json(response).await
    }

    /// Logs in through the API, returning the session data payload
    pub async fn login(&self, username: &str, password: &str) -> Value {
        let response = self
            .post_json(
                "/api/v1/users/login",
                serde_json::json!({"username": username, "password": password}),
            )
            .await;
        assert_eq!(response.status().as_u16(), 200, "login should succeed");
        body_json(response).await["data"].clone()
    }
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<axum::body::Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Collects all Set-Cookie header values
pub fn set_cookies(response: &Response<axum::body::Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

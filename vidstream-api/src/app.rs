/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use vidstream_api::{app::{build_router, AppState}, config::Config};
/// use vidstream_shared::store::postgres::PgUserStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let store = PgUserStore::connect(&config.database.url, 10).await?;
/// let state = AppState::new(Arc::new(store), config)?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use vidstream_shared::{auth::tokens::TokenIssuer, session::SessionManager, store::UserStore};

use crate::{config::Config, middleware::auth_gate, routes};

/// Shared application state.
///
/// Cloned per request via Axum's `State` extractor; the store and config are
/// behind Arcs so the clone is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Credential store
    pub store: Arc<dyn UserStore>,

    /// Session lifecycle orchestrator
    pub sessions: SessionManager,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state over a credential store.
    ///
    /// # Errors
    ///
    /// Fails when the token secrets do not validate; startup-fatal.
    pub fn new(store: Arc<dyn UserStore>, config: Config) -> anyhow::Result<Self> {
        let issuer = TokenIssuer::new(config.auth.token_config()?);
        let sessions = SessionManager::new(store.clone(), issuer);

        Ok(Self {
            store,
            sessions,
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router.
///
/// ```text
/// /
/// ├── /health                          # public
/// └── /api/v1/
///     ├── /users/
///     │   ├── POST /register           # public
///     │   ├── POST /login              # public
///     │   ├── POST /refresh-token      # public (token-gated internally)
///     │   ├── POST /logout             # auth gate
///     │   ├── POST /change-password    # auth gate
///     │   ├── GET  /me                 # auth gate
///     │   └── GET  /history            # auth gate
///     └── /channels/
///         └── GET /:username           # auth gate
/// ```
pub fn build_router(state: AppState) -> Router {
    let public_user_routes = Router::new()
        .route("/register", post(routes::users::register))
        .route("/login", post(routes::users::login))
        .route("/refresh-token", post(routes::users::refresh_token));

    let protected_user_routes = Router::new()
        .route("/logout", post(routes::users::logout))
        .route("/change-password", post(routes::users::change_password))
        .route("/me", get(routes::users::me))
        .route("/history", get(routes::users::watch_history))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_gate::require_auth,
        ));

    let channel_routes = Router::new()
        .route("/:username", get(routes::channels::channel_profile))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_gate::require_auth,
        ));

    let v1_routes = Router::new()
        .nest("/users", public_user_routes.merge(protected_user_routes))
        .nest("/channels", channel_routes);

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::COOKIE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

//! # Vidstream API Server
//!
//! REST backend for the Vidstream video platform: registration, login,
//! JWT access/refresh rotation, and channel/watch-history read models.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p vidstream-api
//! ```

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vidstream_api::{
    app::{build_router, AppState},
    config::Config,
};
use vidstream_shared::store::postgres::PgUserStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidstream_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Vidstream API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let store =
        PgUserStore::connect(&config.database.url, config.database.max_connections).await?;
    store.run_migrations().await?;

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(store), config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

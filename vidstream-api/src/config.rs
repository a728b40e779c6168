/// Configuration management for the API server
///
/// Configuration is read once at startup into a typed struct and injected
/// into the application state; nothing else in the workspace reads the
/// process environment. Invalid or missing secrets abort startup rather
/// than surfacing as per-request errors.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `ACCESS_TOKEN_SECRET`: HS256 secret for access tokens (required, >= 32 bytes)
/// - `REFRESH_TOKEN_SECRET`: HS256 secret for refresh tokens (required, >= 32
///   bytes, must differ from the access secret)
/// - `ACCESS_TOKEN_TTL_MINUTES`: Access token lifetime (default: 15)
/// - `REFRESH_TOKEN_TTL_DAYS`: Refresh token lifetime (default: 7)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `RUST_LOG`: Log filter (default: info)
use serde::{Deserialize, Serialize};
use std::env;
use vidstream_shared::auth::tokens::TokenConfig;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token secrets and lifetimes
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Token issuer configuration as raw environment values.
///
/// Secrets are deliberately skipped during serialization so a debug-dumped
/// config never leaks them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Access token secret
    #[serde(skip_serializing)]
    pub access_secret: String,

    /// Refresh token secret
    #[serde(skip_serializing)]
    pub refresh_secret: String,

    /// Access token lifetime in minutes
    pub access_ttl_minutes: i64,

    /// Refresh token lifetime in days
    pub refresh_ttl_days: i64,
}

impl AuthConfig {
    /// Builds the validated token configuration.
    ///
    /// # Errors
    ///
    /// Fails when secrets are missing, too short, or not independent.
    /// Callers treat this as startup-fatal.
    pub fn token_config(&self) -> anyhow::Result<TokenConfig> {
        TokenConfig::new(
            self.access_secret.clone(),
            self.refresh_secret.clone(),
            self.access_ttl_minutes,
            self.refresh_ttl_days,
        )
        .map_err(|e| anyhow::anyhow!("{e}"))
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid,
    /// including the token-secret validity checks.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let access_secret = env::var("ACCESS_TOKEN_SECRET")
            .map_err(|_| anyhow::anyhow!("ACCESS_TOKEN_SECRET environment variable is required"))?;
        let refresh_secret = env::var("REFRESH_TOKEN_SECRET").map_err(|_| {
            anyhow::anyhow!("REFRESH_TOKEN_SECRET environment variable is required")
        })?;
        let access_ttl_minutes = env::var("ACCESS_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse::<i64>()?;
        let refresh_ttl_days = env::var("REFRESH_TOKEN_TTL_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse::<i64>()?;

        let auth = AuthConfig {
            access_secret,
            refresh_secret,
            access_ttl_minutes,
            refresh_ttl_days,
        };
        // Fail startup now, not on the first login
        auth.token_config()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

/// JWT access/refresh token issuance and validation
///
/// Tokens are signed with HS256 (HMAC-SHA256). Access and refresh tokens use
/// two independent secrets, so compromise of one class never allows forging
/// the other. Secrets and lifetimes are injected through [`TokenConfig`] at
/// construction; nothing in this module reads the process environment.
///
/// # Token Types
///
/// - **Access token**: minutes-scale lifetime, carries the profile claims
///   (username, email, full name) so the auth gate can serve identity without
///   a store round-trip.
/// - **Refresh token**: days-scale lifetime, carries only the subject id.
///   Keeping the payload minimal limits blast radius if one leaks before
///   expiry, and profile data in it could only go stale.
///
/// # Example
///
/// ```
/// use vidstream_shared::auth::tokens::{TokenConfig, TokenIssuer};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TokenConfig::new(
///     "access-secret-at-least-32-bytes-long!!",
///     "refresh-secret-at-least-32-bytes-long!",
///     15, // minutes
///     7,  // days
/// )?;
/// let issuer = TokenIssuer::new(config);
///
/// let user_id = Uuid::new_v4();
/// let token = issuer.issue_refresh_token(user_id)?;
/// let claims = issuer.verify_refresh_token(&token)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::User;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Secrets missing, too short, or not independent. Startup-fatal.
    #[error("Token configuration invalid: {0}")]
    Misconfigured(String),

    /// Failed to sign a token
    #[error("Failed to sign token: {0}")]
    Signing(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Bad signature, wrong secret, or malformed token
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Secrets and lifetimes for both token classes.
///
/// Fields are public so tests can construct degenerate configurations
/// (e.g. a negative TTL to mint an already-expired token).
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HS256 secret for access tokens (at least 32 bytes)
    pub access_secret: String,

    /// HS256 secret for refresh tokens (at least 32 bytes, must differ
    /// from the access secret)
    pub refresh_secret: String,

    /// Access token lifetime (minutes-scale)
    pub access_ttl: Duration,

    /// Refresh token lifetime (days-scale)
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// Builds a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Misconfigured` if either secret is shorter than
    /// 32 bytes or the two secrets are equal. Callers should treat this as
    /// fatal at startup, not as a per-request condition.
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        access_ttl_minutes: i64,
        refresh_ttl_days: i64,
    ) -> Result<Self, TokenError> {
        let access_secret = access_secret.into();
        let refresh_secret = refresh_secret.into();

        if access_secret.len() < 32 {
            return Err(TokenError::Misconfigured(
                "access token secret must be at least 32 bytes".to_string(),
            ));
        }
        if refresh_secret.len() < 32 {
            return Err(TokenError::Misconfigured(
                "refresh token secret must be at least 32 bytes".to_string(),
            ));
        }
        if access_secret == refresh_secret {
            return Err(TokenError::Misconfigured(
                "access and refresh token secrets must be independent".to_string(),
            ));
        }

        Ok(Self {
            access_secret,
            refresh_secret,
            access_ttl: Duration::minutes(access_ttl_minutes),
            refresh_ttl: Duration::days(refresh_ttl_days),
        })
    }
}

/// Claims carried by an access token.
///
/// The profile fields let protected handlers answer "who is calling" without
/// a credential-store lookup when the full record is not needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - user id
    pub sub: Uuid,

    /// Username at issuance time
    pub username: String,

    /// Email at issuance time
    pub email: String,

    /// Display name at issuance time
    pub full_name: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Claims carried by a refresh token. Subject id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject - user id
    pub sub: Uuid,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signs and validates both token classes against their respective secrets.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    config: TokenConfig,
}

impl TokenIssuer {
    /// Creates an issuer from a validated configuration
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Issues an access token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_access_token(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            iat: now.timestamp(),
            exp: (now + self.config.access_ttl).timestamp(),
        };

        sign(&claims, &self.config.access_secret)
    }

    /// Issues a refresh token carrying only the subject id.
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.config.refresh_ttl).timestamp(),
        };

        sign(&claims, &self.config.refresh_secret)
    }

    /// Validates an access token against the access secret.
    ///
    /// # Errors
    ///
    /// `TokenError::Expired` past the exp claim, `TokenError::Invalid` on a
    /// bad signature or malformed token.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        verify(token, &self.config.access_secret)
    }

    /// Validates a refresh token against the refresh secret.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        verify(token, &self.config.refresh_secret)
    }
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| TokenError::Signing(format!("{}", e)))
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<T>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(format!("{}", e)),
    })?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TokenConfig {
        TokenConfig::new(
            "access-secret-for-tests-0123456789abcdef",
            "refresh-secret-for-tests-0123456789abcdef",
            15,
            7,
        )
        .expect("test config should validate")
    }

    fn test_user() -> User {
        crate::testutil::user("alice", "alice@example.com", "Alice")
    }

    #[test]
    fn test_config_rejects_short_secrets() {
        assert!(matches!(
            TokenConfig::new("short", "refresh-secret-long-enough-0123456789", 15, 7),
            Err(TokenError::Misconfigured(_))
        ));
        assert!(matches!(
            TokenConfig::new("access-secret-long-enough-0123456789", "short", 15, 7),
            Err(TokenError::Misconfigured(_))
        ));
    }

    #[test]
    fn test_config_rejects_shared_secret() {
        let secret = "the-same-secret-for-both-0123456789abc";
        assert!(matches!(
            TokenConfig::new(secret, secret, 15, 7),
            Err(TokenError::Misconfigured(_))
        ));
    }

    #[test]
    fn test_access_token_roundtrip() {
        let issuer = TokenIssuer::new(test_config());
        let user = test_user();

        let token = issuer.issue_access_token(&user).expect("Should sign");
        let claims = issuer.verify_access_token(&token).expect("Should verify");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.full_name, "Alice");
    }

    #[test]
    fn test_refresh_token_roundtrip() {
        let issuer = TokenIssuer::new(test_config());
        let user_id = Uuid::new_v4();

        let token = issuer.issue_refresh_token(user_id).expect("Should sign");
        let claims = issuer.verify_refresh_token(&token).expect("Should verify");

        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issuer = TokenIssuer::new(test_config());
        let other = TokenIssuer::new(
            TokenConfig::new(
                "a-different-access-secret-0123456789abc",
                "a-different-refresh-secret-0123456789ab",
                15,
                7,
            )
            .unwrap(),
        );

        let token = issuer.issue_access_token(&test_user()).unwrap();
        assert!(matches!(
            other.verify_access_token(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_cross_class_verification_fails() {
        // An access token must not verify as a refresh token: the secrets
        // are independent by construction.
        let issuer = TokenIssuer::new(test_config());

        let access = issuer.issue_access_token(&test_user()).unwrap();
        assert!(issuer.verify_refresh_token(&access).is_err());

        let refresh = issuer.issue_refresh_token(Uuid::new_v4()).unwrap();
        assert!(issuer.verify_access_token(&refresh).is_err());
    }

    #[test]
    fn test_expired_token_fails_with_expired() {
        let mut config = test_config();
        config.access_ttl = Duration::seconds(-3600);
        config.refresh_ttl = Duration::seconds(-3600);
        let issuer = TokenIssuer::new(config);

        let access = issuer.issue_access_token(&test_user()).unwrap();
        assert!(matches!(
            issuer.verify_access_token(&access),
            Err(TokenError::Expired)
        ));

        let refresh = issuer.issue_refresh_token(Uuid::new_v4()).unwrap();
        assert!(matches!(
            issuer.verify_refresh_token(&refresh),
            Err(TokenError::Expired)
        ));
    }
}

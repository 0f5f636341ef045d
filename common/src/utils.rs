// Common Crate - utils.rs
// common/src/utils.rs
use chrono::{TimeZone, Utc};
use jsonwebtoken::{encode, decode, Header, Algorithm, Validation, EncodingKey, DecodingKey};
use serde::{Serialize, Deserialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::models::session::AuthenticatedSession;

/// Login tokens stay valid for one day
pub const TOKEN_TTL_SECONDS: usize = 86400;

/// Setup tracing for consistent logging across crates.
/// `RUST_LOG` overrides the default `info` level.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,       // user id
    pub email: String,
    pub exp: usize,        // expiration time
    pub iat: usize,        // issued at time
}

// Generate a login token for a user
pub fn generate_jwt_token(user_id: i64, email: &str, secret: &[u8]) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize;

    let claims = JwtClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + TOKEN_TTL_SECONDS,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret)
    )
}

// Validate a login token and turn it into a session
pub fn validate_jwt_token(token: &str, secret: &[u8]) -> Result<AuthenticatedSession, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &validation
    )?;
    let claims = token_data.claims;

    let user_id = claims.sub.parse::<i64>()
        .map_err(|_| jsonwebtoken::errors::ErrorKind::InvalidSubject)?;

    let issued_at = Utc.timestamp_opt(claims.iat as i64, 0)
        .single()
        .ok_or(jsonwebtoken::errors::ErrorKind::InvalidToken)?;
    let expires_at = Utc.timestamp_opt(claims.exp as i64, 0)
        .single()
        .ok_or(jsonwebtoken::errors::ErrorKind::ExpiredSignature)?;

    Ok(AuthenticatedSession::new(user_id, claims.email, issued_at, expires_at))
}

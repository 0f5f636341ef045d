// common/src/models/session.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Proof that a caller logged in. Only obtainable by validating a signed
/// login token (see [`crate::utils::validate_jwt_token`]), and passed
/// explicitly into every certificate load.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedSession {
    user_id: i64,
    email: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AuthenticatedSession {
    pub(crate) fn new(
        user_id: i64,
        email: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            email,
            issued_at,
            expires_at,
        }
    }

    /// Build a session directly, bypassing token validation
    #[cfg(any(test, feature = "test-util"))]
    pub fn for_tests(
        user_id: i64,
        email: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self::new(user_id, email.to_string(), issued_at, expires_at)
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Check whether the session has expired at the given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

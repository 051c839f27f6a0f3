//! Authenticate Use Case
//!
//! The authentication gate: verify the bearer token, then check the
//! deny-list. Expired or forged tokens fail before any store round-trip.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::cache::CacheClient;
use platform::password::Hasher;

use crate::application::token_authority::SessionTokenAuthority;
use crate::error::{AuthError, AuthResult};

/// Session attached to an authenticated request
#[derive(Clone)]
pub struct AuthenticatedSession {
    /// Raw bearer token (needed to revoke at logout)
    pub token: String,
    /// User id
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedSession")
            .field("token", &"[REDACTED]")
            .field("subject", &self.subject)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Authenticate use case
pub struct AuthenticateUseCase<H, C>
where
    H: Hasher,
    C: CacheClient,
{
    tokens: Arc<SessionTokenAuthority<H, C>>,
}

impl<H, C> AuthenticateUseCase<H, C>
where
    H: Hasher,
    C: CacheClient,
{
    pub fn new(tokens: Arc<SessionTokenAuthority<H, C>>) -> Self {
        Self { tokens }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<AuthenticatedSession> {
        let verified = self.tokens.verify(token)?;

        if self.tokens.is_revoked(token).await? {
            return Err(AuthError::TokenRevoked);
        }

        Ok(AuthenticatedSession {
            token: token.to_string(),
            subject: verified.subject,
            issued_at: verified.issued_at,
            expires_at: verified.expires_at,
        })
    }
}

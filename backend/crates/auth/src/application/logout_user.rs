//! Logout User Use Case
//!
//! Revokes the presented access token until it expires. Logging out twice
//! is a no-op.

use std::sync::Arc;

use platform::cache::CacheClient;
use platform::password::Hasher;

use crate::application::authenticate::AuthenticatedSession;
use crate::application::token_authority::SessionTokenAuthority;
use crate::error::AuthResult;

/// Logout user use case
pub struct LogoutUserUseCase<H, C>
where
    H: Hasher,
    C: CacheClient,
{
    tokens: Arc<SessionTokenAuthority<H, C>>,
}

impl<H, C> LogoutUserUseCase<H, C>
where
    H: Hasher,
    C: CacheClient,
{
    pub fn new(tokens: Arc<SessionTokenAuthority<H, C>>) -> Self {
        Self { tokens }
    }

    pub async fn execute(&self, session: &AuthenticatedSession) -> AuthResult<()> {
        if self.tokens.is_revoked(&session.token).await? {
            return Ok(());
        }

        self.tokens
            .revoke(&session.token, &session.subject, session.expires_at)
            .await?;

        tracing::info!(user_id = %session.subject, "User logged out");
        Ok(())
    }
}

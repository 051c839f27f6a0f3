//! Login User Use Case
//!
//! Checks credentials and issues an access token. Unknown user names and
//! wrong passwords fail with the same error.

use std::sync::Arc;

use platform::cache::CacheClient;
use platform::password::Hasher;

use crate::application::run_hasher;
use crate::application::token_authority::SessionTokenAuthority;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{password::RawPassword, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginUserInput {
    pub username: String,
    pub password: String,
}

/// Login output
pub struct LoginUserOutput {
    pub access_token: String,
}

/// Login user use case
pub struct LoginUserUseCase<U, P, H, C>
where
    U: UserRepository,
    P: Hasher + 'static,
    H: Hasher,
    C: CacheClient,
{
    user_repo: Arc<U>,
    passwords: Arc<P>,
    tokens: Arc<SessionTokenAuthority<H, C>>,
}

impl<U, P, H, C> LoginUserUseCase<U, P, H, C>
where
    U: UserRepository,
    P: Hasher + 'static,
    H: Hasher,
    C: CacheClient,
{
    pub fn new(
        user_repo: Arc<U>,
        passwords: Arc<P>,
        tokens: Arc<SessionTokenAuthority<H, C>>,
    ) -> Self {
        Self {
            user_repo,
            passwords,
            tokens,
        }
    }

    pub async fn execute(&self, input: LoginUserInput) -> AuthResult<LoginUserOutput> {
        let user_name =
            UserName::new(&input.username).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .user_repo
            .find_by_user_name(&user_name)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let raw_password = RawPassword::for_login(input.password);
        let digest = user.password.clone();
        let matches = run_hasher(Arc::clone(&self.passwords), move |hasher| {
            hasher.compare(raw_password.expose(), digest.as_str())
        })
        .await?;

        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(user.id.as_str(), None)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginUserOutput { access_token })
    }
}

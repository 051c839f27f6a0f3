//! Register User Use Case
//!
//! Creates a new user account.

use std::sync::Arc;

use platform::password::Hasher;

use crate::application::run_hasher;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    password::{PasswordDigest, RawPassword},
    user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterUserInput {
    pub username: String,
    pub password: String,
}

/// Register output
pub struct RegisterUserOutput {
    pub user_id: String,
}

/// Register user use case
pub struct RegisterUserUseCase<U, P>
where
    U: UserRepository,
    P: Hasher + 'static,
{
    user_repo: Arc<U>,
    passwords: Arc<P>,
}

impl<U, P> RegisterUserUseCase<U, P>
where
    U: UserRepository,
    P: Hasher + 'static,
{
    pub fn new(user_repo: Arc<U>, passwords: Arc<P>) -> Self {
        Self {
            user_repo,
            passwords,
        }
    }

    pub async fn execute(&self, input: RegisterUserInput) -> AuthResult<RegisterUserOutput> {
        let user_name = UserName::new(&input.username)
            .map_err(|e| AuthError::validation("username", e.to_string()))?;

        let raw_password = RawPassword::new(input.password)
            .map_err(|e| AuthError::validation("password", e.to_string()))?;

        // KDF は高コストなので重複チェックを先に行う
        if self
            .user_repo
            .find_by_user_name(&user_name)
            .await?
            .is_some()
        {
            return Err(AuthError::UserNameTaken);
        }

        let digest = run_hasher(Arc::clone(&self.passwords), move |hasher| {
            hasher.hash(raw_password.expose())
        })
        .await?;

        let user = User::new(user_name, PasswordDigest::new(digest));

        // 同時登録は UNIQUE 制約で UserNameTaken になる
        self.user_repo.create(&user).await?;

        tracing::info!(
            user_id = %user.id,
            user_name = %user.user_name,
            "User registered"
        );

        Ok(RegisterUserOutput {
            user_id: user.id.into_string(),
        })
    }
}

//! Current User Use Case

use std::sync::Arc;

use crate::application::authenticate::AuthenticatedSession;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Current user use case
pub struct CurrentUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> CurrentUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, session: &AuthenticatedSession) -> AuthResult<User> {
        let user_id = UserId::parse(session.subject.as_str()).map_err(|_| AuthError::UserNotFound)?;

        self.user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

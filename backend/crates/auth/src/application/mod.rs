//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod current_user;
pub mod login_user;
pub mod logout_user;
pub mod register_user;
pub mod token_authority;

use std::sync::Arc;

use platform::password::{HashError, Hasher};

use crate::error::{AuthError, AuthResult};

// Re-exports
pub use authenticate::{AuthenticateUseCase, AuthenticatedSession};
pub use config::AuthConfig;
pub use current_user::CurrentUserUseCase;
pub use login_user::{LoginUserInput, LoginUserOutput, LoginUserUseCase};
pub use logout_user::LogoutUserUseCase;
pub use register_user::{RegisterUserInput, RegisterUserOutput, RegisterUserUseCase};
pub use token_authority::{SessionTokenAuthority, VerifiedToken};

/// Run a memory-hard hashing operation off the async runtime
pub(crate) async fn run_hasher<P, T, F>(hasher: Arc<P>, op: F) -> AuthResult<T>
where
    P: Hasher + 'static,
    T: Send + 'static,
    F: FnOnce(&P) -> Result<T, HashError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&hasher))
        .await
        .map_err(|e| AuthError::Internal(format!("Hashing task failed: {e}")))?
        .map_err(AuthError::from)
}

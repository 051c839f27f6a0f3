//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use platform::cache::CacheClient;
use platform::crypto::HmacFingerprinter;
use platform::password::KdfHasher;
use std::sync::Arc;

use crate::application::{
    AuthenticatedSession, CurrentUserUseCase, LoginUserInput, LoginUserUseCase,
    LogoutUserUseCase, RegisterUserInput, RegisterUserUseCase, SessionTokenAuthority,
};
use crate::domain::repository::UserRepository;
use crate::error::AuthResult;
use crate::presentation::dto::{
    AccessTokenData, CredentialsRequest, LoginResponse, MessageResponse, UserResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<U, C>
where
    U: UserRepository + Send + Sync + 'static,
    C: CacheClient,
{
    pub users: Arc<U>,
    pub passwords: Arc<KdfHasher>,
    pub tokens: Arc<SessionTokenAuthority<HmacFingerprinter, C>>,
}

impl<U, C> AuthAppState<U, C>
where
    U: UserRepository + Send + Sync + 'static,
    C: CacheClient,
{
    pub fn new(
        users: U,
        passwords: KdfHasher,
        tokens: SessionTokenAuthority<HmacFingerprinter, C>,
    ) -> Self {
        Self {
            users: Arc::new(users),
            passwords: Arc::new(passwords),
            tokens: Arc::new(tokens),
        }
    }
}

impl<U, C> Clone for AuthAppState<U, C>
where
    U: UserRepository + Send + Sync + 'static,
    C: CacheClient,
{
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            passwords: Arc::clone(&self.passwords),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /auth/register
pub async fn register<U, C>(
    State(state): State<AuthAppState<U, C>>,
    Json(req): Json<CredentialsRequest>,
) -> AuthResult<(StatusCode, Json<MessageResponse>)>
where
    U: UserRepository + Send + Sync + 'static,
    C: CacheClient,
{
    let use_case = RegisterUserUseCase::new(state.users.clone(), state.passwords.clone());

    use_case
        .execute(RegisterUserInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully",
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /auth/login
pub async fn login<U, C>(
    State(state): State<AuthAppState<U, C>>,
    Json(req): Json<CredentialsRequest>,
) -> AuthResult<Json<LoginResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    C: CacheClient,
{
    let use_case = LoginUserUseCase::new(
        state.users.clone(),
        state.passwords.clone(),
        state.tokens.clone(),
    );

    let output = use_case
        .execute(LoginUserInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        data: AccessTokenData {
            access_token: output.access_token,
        },
    }))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /auth/me
pub async fn me<U, C>(
    State(state): State<AuthAppState<U, C>>,
    Extension(session): Extension<AuthenticatedSession>,
) -> AuthResult<Json<UserResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    C: CacheClient,
{
    let use_case = CurrentUserUseCase::new(state.users.clone());
    let user = use_case.execute(&session).await?;

    Ok(Json(user.into()))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /auth/logout
pub async fn logout<U, C>(
    State(state): State<AuthAppState<U, C>>,
    Extension(session): Extension<AuthenticatedSession>,
) -> AuthResult<Json<MessageResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    C: CacheClient,
{
    let use_case = LogoutUserUseCase::new(state.tokens.clone());
    use_case.execute(&session).await?;

    Ok(Json(MessageResponse {
        message: "User successfully logged out",
    }))
}

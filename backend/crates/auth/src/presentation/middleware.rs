//! Auth Middleware
//!
//! Authentication gate for protected routes. On success the
//! [`AuthenticatedSession`] is inserted into request extensions.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::Response;
use platform::cache::CacheClient;

use crate::application::{AuthenticateUseCase, AuthenticatedSession};
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::handlers::AuthAppState;

/// Middleware that requires a valid, unrevoked bearer token
pub async fn require_auth<U, C>(
    State(state): State<AuthAppState<U, C>>,
    mut req: Request<Body>,
    next: Next,
) -> AuthResult<Response>
where
    U: UserRepository + Send + Sync + 'static,
    C: CacheClient,
{
    let token = extract_bearer_token(req.headers()).ok_or(AuthError::MissingToken)?;

    let use_case = AuthenticateUseCase::new(state.tokens.clone());
    let session: AuthenticatedSession = use_case.execute(token).await?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    let token = token.trim();
    if scheme != "Bearer" || token.is_empty() {
        return None;
    }
    Some(token)
}

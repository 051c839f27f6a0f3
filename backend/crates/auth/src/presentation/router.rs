//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use platform::cache::CacheClient;

use crate::domain::repository::UserRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_auth;

/// Create the Auth router (mount under `/auth`)
pub fn auth_router<U, C>(state: AuthAppState<U, C>) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    C: CacheClient,
{
    let protected = Router::new()
        .route("/me", get(handlers::me::<U, C>))
        .route("/logout", post(handlers::logout::<U, C>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<U, C>,
        ));

    Router::new()
        .route("/register", post(handlers::register::<U, C>))
        .route("/login", post(handlers::login::<U, C>))
        .merge(protected)
        .with_state(state)
}

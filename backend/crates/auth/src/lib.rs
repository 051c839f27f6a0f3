//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Session token authority, use cases, configuration
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, authentication gate
//!
//! ## Features
//! - User registration and login with username + password
//! - Stateless HS256 access tokens (`Authorization: Bearer`)
//! - Logout by revoking the token until it expires (cache-backed deny-list)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id under a process-wide salt
//! - Token algorithm pinned to HS256; expiry checked without leeway
//! - Deny-list keyed by an HMAC fingerprint of the token, never the token
//! - Entry TTL equals the token's remaining lifetime

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::token_authority::SessionTokenAuthority;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgUserRepository;
pub use presentation::{AuthAppState, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[cfg(test)]
mod tests;

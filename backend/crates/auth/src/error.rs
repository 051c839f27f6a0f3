//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! The token authority and use cases only classify and return these errors.
//! Logging happens once, when an error is turned into an HTTP response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::cache::CacheError;
use platform::password::HashError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong user name or wrong password (indistinguishable by design of the message)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Authorization header missing or not a bearer token
    #[error("No access token provided")]
    MissingToken,

    /// Token is past its expiry
    #[error("Authentication token has expired")]
    TokenExpired,

    /// Bad signature, malformed structure, wrong algorithm or claim types
    #[error("Invalid authentication token")]
    TokenInvalid,

    /// Token fingerprint is on the deny-list
    #[error("Token has been revoked. Please login again")]
    TokenRevoked,

    /// Revocation store used outside a connected scope
    #[error("Cache store is not connected")]
    NotConnected,

    /// Revocation store unreachable
    #[error("Cache connection failed")]
    CacheConnection(#[source] BoxError),

    /// Revocation store operation failed after connecting
    #[error("Cache query failed: {message}")]
    CacheQuery {
        message: String,
        #[source]
        source: BoxError,
    },

    /// Hashing could not run
    #[error("Hashing failed: {0}")]
    ResourceExhaustion(String),

    /// User name already exists
    #[error("User name already exists")]
    UserNameTaken,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Request input rejected by a domain rule
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::TokenRevoked => ErrorKind::Unauthorized,
            AuthError::UserNameTaken => ErrorKind::Conflict,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Validation { .. } => ErrorKind::BadRequest,
            AuthError::NotConnected | AuthError::CacheConnection(_) => {
                ErrorKind::ServiceUnavailable
            }
            AuthError::CacheQuery { .. }
            | AuthError::ResourceExhaustion(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "USER_INVALID_CREDENTIALS_ERROR",
            AuthError::MissingToken => "MISSING_ACCESS_TOKEN_ERROR",
            AuthError::TokenExpired => "TOKEN_EXPIRED_ERROR",
            AuthError::TokenInvalid => "TOKEN_INVALID_ERROR",
            AuthError::TokenRevoked => "TOKEN_REVOKED_ERROR",
            AuthError::NotConnected | AuthError::CacheConnection(_) => "CACHE_CONNECTION_ERROR",
            AuthError::CacheQuery { .. } => "CACHE_QUERY_ERROR",
            AuthError::ResourceExhaustion(_) => "HASHING_ERROR",
            AuthError::UserNameTaken => "USER_NAME_ALREADY_TAKEN_ERROR",
            AuthError::UserNotFound => "USER_NOT_FOUND_ERROR",
            AuthError::Validation { .. } => "INVALID_INPUT_REQUEST_ERROR",
            AuthError::Database(_) => "DATABASE_QUERY_ERROR",
            AuthError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string()).with_code(self.code())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::CacheConnection(e) => {
                tracing::error!(error = %e, "Revocation store unreachable");
            }
            AuthError::CacheQuery { message, source } => {
                tracing::error!(message = %message, error = %source, "Revocation store query failed");
            }
            AuthError::ResourceExhaustion(msg) | AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::NotConnected => {
                tracing::error!("Revocation store used while disconnected");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::TokenInvalid => {
                tracing::warn!("Invalid access token presented");
            }
            AuthError::TokenRevoked => {
                tracing::warn!("Revoked access token presented");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<CacheError> for AuthError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::NotConnected => AuthError::NotConnected,
            CacheError::Connection(source) => AuthError::CacheConnection(source),
            CacheError::Query { operation, source } => AuthError::CacheQuery {
                message: format!("{operation} failed"),
                source,
            },
            err @ CacheError::InvalidTtl(_) => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<HashError> for AuthError {
    fn from(err: HashError) -> Self {
        match err {
            HashError::ResourceExhaustion(msg) => AuthError::ResourceExhaustion(msg),
            other => AuthError::Internal(other.to_string()),
        }
    }
}

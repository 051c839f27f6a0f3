//! Application Configuration
//!
//! Immutable configuration for the Auth application layer, built once at
//! startup and shared as `Arc<AuthConfig>`.

use std::fmt;
use std::time::Duration;

use platform::config::{ConfigError, MIN_SECRET_LENGTH, parse_duration, require_min_length};
use zeroize::Zeroizing;

pub const ENV_TOKEN_SECRET: &str = "JWT_ACCESS_TOKEN_SECRET";
pub const ENV_TOKEN_LIFETIME: &str = "JWT_ACCESS_TOKEN_EXP_TIME";
pub const ENV_PASSWORD_SALT: &str = "PASSWORD_HASH_SALT";

/// Default access token lifetime
pub const DEFAULT_TOKEN_LIFETIME: &str = "2h";

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Access token lifetime
    token_lifetime: Duration,
    /// HS256 signing secret
    token_secret: Zeroizing<String>,
    /// Process-wide salt for credential hashing and token fingerprints
    password_salt: Zeroizing<String>,
}

impl AuthConfig {
    /// Build and validate configuration
    pub fn new(
        token_lifetime: &str,
        token_secret: impl Into<String>,
        password_salt: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let token_secret = Zeroizing::new(token_secret.into());
        let password_salt = Zeroizing::new(password_salt.into());

        require_min_length(ENV_TOKEN_SECRET, &token_secret, MIN_SECRET_LENGTH)?;
        require_min_length(ENV_PASSWORD_SALT, &password_salt, MIN_SECRET_LENGTH)?;

        Ok(Self {
            token_lifetime: parse_duration(token_lifetime)?,
            token_secret,
            password_salt,
        })
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required =
            |name: &str| lookup(name).ok_or_else(|| ConfigError::Missing(name.to_string()));

        let token_secret = required(ENV_TOKEN_SECRET)?;
        let password_salt = required(ENV_PASSWORD_SALT)?;
        let lifetime =
            lookup(ENV_TOKEN_LIFETIME).unwrap_or_else(|| DEFAULT_TOKEN_LIFETIME.to_string());

        Self::new(&lifetime, token_secret, password_salt)
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    pub fn token_lifetime_secs(&self) -> i64 {
        self.token_lifetime.as_secs() as i64
    }

    pub fn token_secret(&self) -> &[u8] {
        self.token_secret.as_bytes()
    }

    pub fn password_salt(&self) -> &[u8] {
        self.password_salt.as_bytes()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_lifetime", &self.token_lifetime)
            .field("token_secret", &"[REDACTED]")
            .field("password_salt", &"[REDACTED]")
            .finish()
    }
}

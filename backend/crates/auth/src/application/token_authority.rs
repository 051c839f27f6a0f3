//! Session Token Authority
//!
//! Issues, verifies and revokes signed access tokens.
//!
//! ## Token format
//! Compact JWS, `HS256` only. Payload: `sub` (string), `iat` and `exp`
//! (integer seconds), plus optional extra claims.
//!
//! ## Lifecycle
//! `Issued → Active → {Expired | Revoked}`. State is never stored: expiry is
//! recomputed on every `verify`, revocation is looked up on every
//! `is_revoked`.
//!
//! ## Revocation
//! Revoked tokens are stored as `blacklist:token:<fingerprint> → subject` with
//! a TTL equal to the token's remaining lifetime, so an entry never outlives
//! (or expires before) the token it denies. The raw token is never stored.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use platform::cache::{CacheClient, CacheStore};
use platform::password::Hasher;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::application::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// Signing algorithm (pinned, never negotiated)
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Key prefix for revocation entries
pub const REVOCATION_KEY_PREFIX: &str = "blacklist:token";

/// Claim names that extra claims can never override
pub const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Claims of a token that passed `verify`
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub extra: Map<String, Value>,
}

/// Session Token Authority
///
/// - `H`: fingerprinter for revocation keys
/// - `C`: revocation store client
pub struct SessionTokenAuthority<H, C>
where
    H: Hasher,
    C: CacheClient,
{
    config: Arc<AuthConfig>,
    fingerprinter: Arc<H>,
    cache: Arc<C>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl<H, C> SessionTokenAuthority<H, C>
where
    H: Hasher,
    C: CacheClient,
{
    pub fn new(config: Arc<AuthConfig>, fingerprinter: Arc<H>, cache: Arc<C>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.token_secret());
        let decoding_key = DecodingKey::from_secret(config.token_secret());

        // Expiry is checked in `verify` at second precision with no leeway
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&RESERVED_CLAIMS);

        Self {
            config,
            fingerprinter,
            cache,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Issue a token for `subject`
    ///
    /// `iat` is the current second; `exp` is `iat` plus the configured
    /// lifetime. Extra claims named `sub`, `iat` or `exp` are dropped.
    pub fn issue(&self, subject: &str, extra: Option<&Map<String, Value>>) -> AuthResult<String> {
        let iat = Utc::now().timestamp();
        let exp = iat + self.config.token_lifetime_secs();

        let extra: Map<String, Value> = extra
            .map(|claims| {
                claims
                    .iter()
                    .filter(|(name, _)| !RESERVED_CLAIMS.contains(&name.as_str()))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp,
            extra,
        };

        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify signature, algorithm, claim types and expiry
    ///
    /// Pure: the revocation store is not consulted.
    pub fn verify(&self, token: &str) -> AuthResult<VerifiedToken> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::TokenInvalid)?;
        let claims = data.claims;

        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(AuthError::TokenInvalid)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::TokenInvalid)?;

        if Utc::now() >= expires_at {
            return Err(AuthError::TokenExpired);
        }

        Ok(VerifiedToken {
            subject: claims.sub,
            issued_at,
            expires_at,
            extra: claims.extra,
        })
    }

    /// Whether the token's fingerprint is on the deny-list
    pub async fn is_revoked(&self, token: &str) -> AuthResult<bool> {
        let key = self.revocation_key(token)?;

        let store = self.cache.store();
        let found = match store.connect().await {
            Ok(()) => store.get(&key).await,
            Err(e) => Err(e),
        };
        let released = store.disconnect().await;

        let found = found?;
        released?;
        Ok(found.is_some())
    }

    /// Deny `token` until `expires_at`
    ///
    /// `expires_at` is trusted as given. Revoking a token whose expiry has
    /// already passed stores nothing.
    pub async fn revoke(
        &self,
        token: &str,
        subject: &str,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()> {
        let ttl_secs = expires_at.timestamp() - Utc::now().timestamp();
        if ttl_secs <= 0 {
            return Ok(());
        }

        let key = self.revocation_key(token)?;

        let store = self.cache.store();
        let stored = match store.connect().await {
            Ok(()) => store.set(&key, subject, ttl_secs).await,
            Err(e) => Err(e),
        };
        let released = store.disconnect().await;

        stored?;
        released?;
        Ok(())
    }

    /// Deny `token` using its own verified subject and expiry
    ///
    /// Expired tokens are a no-op; tokens that fail verification are rejected.
    pub async fn revoke_token(&self, token: &str) -> AuthResult<()> {
        match self.verify(token) {
            Ok(verified) => {
                self.revoke(token, &verified.subject, verified.expires_at)
                    .await
            }
            Err(AuthError::TokenExpired) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Cache key for a token's revocation entry
    pub fn revocation_key(&self, token: &str) -> AuthResult<String> {
        let fingerprint = self.fingerprinter.hash(token)?;
        Ok(format!("{REVOCATION_KEY_PREFIX}:{fingerprint}"))
    }
}

impl<H, C> Clone for SessionTokenAuthority<H, C>
where
    H: Hasher,
    C: CacheClient,
{
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            fingerprinter: Arc::clone(&self.fingerprinter),
            cache: Arc::clone(&self.cache),
            encoding_key: self.encoding_key.clone(),
            decoding_key: self.decoding_key.clone(),
            validation: self.validation.clone(),
        }
    }
}

//! Credential Hashing
//!
//! Deterministic one-way hashing behind a small capability trait:
//! - [`Hasher`]: `hash` / `compare` over hex digests
//! - [`KdfHasher`]: Argon2id with a process-wide salt (credential storage)
//!
//! ## Security Notes
//! - A single salt is shared by every digest, so equal inputs produce equal
//!   digests. Callers that need per-record salts must store them alongside.
//! - `compare` recomputes and compares in constant time.
//! - Salt bytes are zeroized on drop.

use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::crypto::constant_time_eq;

/// Minimum salt length accepted by the KDF (bytes)
pub const MIN_SALT_LENGTH: usize = 8;

// ============================================================================
// Error Types
// ============================================================================

/// Hashing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    /// Derivation could not run (memory allocation, internal failure)
    #[error("Hashing failed: {0}")]
    ResourceExhaustion(String),

    /// KDF cost parameters rejected
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Salt shorter than the KDF accepts
    #[error("Salt must be at least {min} bytes (got {actual})")]
    InvalidSalt { min: usize, actual: usize },
}

// ============================================================================
// Capability
// ============================================================================

/// One-way hashing capability
///
/// Implementations must be deterministic: the same input always yields the
/// same digest for the lifetime of the process.
pub trait Hasher: Send + Sync {
    /// Hash `plaintext` into a lowercase hex digest
    fn hash(&self, plaintext: &str) -> Result<String, HashError>;

    /// Check whether `plaintext` hashes to `digest`
    fn compare(&self, plaintext: &str, digest: &str) -> Result<bool, HashError> {
        let computed = self.hash(plaintext)?;
        Ok(constant_time_eq(computed.as_bytes(), digest.as_bytes()))
    }
}

// ============================================================================
// Argon2id KDF
// ============================================================================

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub m_cost: u32,
    /// Iterations
    pub t_cost: u32,
    /// Lanes
    pub p_cost: u32,
    /// Digest length in bytes
    pub output_len: usize,
}

impl Default for KdfParams {
    /// OWASP recommended minimum (19 MiB, 2 iterations, 1 lane), 64-byte digest
    fn default() -> Self {
        Self {
            m_cost: 19_456,
            t_cost: 2,
            p_cost: 1,
            output_len: 64,
        }
    }
}

impl KdfParams {
    /// Low-cost parameters for tests and local tooling
    pub fn insecure_fast() -> Self {
        Self {
            m_cost: 1_024,
            t_cost: 1,
            p_cost: 1,
            output_len: 64,
        }
    }
}

/// Argon2id hasher with a process-wide salt
pub struct KdfHasher {
    salt: Zeroizing<Vec<u8>>,
    params: KdfParams,
}

impl KdfHasher {
    pub fn new(salt: &[u8], params: KdfParams) -> Result<Self, HashError> {
        if salt.len() < MIN_SALT_LENGTH {
            return Err(HashError::InvalidSalt {
                min: MIN_SALT_LENGTH,
                actual: salt.len(),
            });
        }
        // Fail at construction rather than on the first request
        build_params(&params)?;

        Ok(Self {
            salt: Zeroizing::new(salt.to_vec()),
            params,
        })
    }

    pub fn params(&self) -> KdfParams {
        self.params
    }
}

fn build_params(params: &KdfParams) -> Result<Params, HashError> {
    Params::new(
        params.m_cost,
        params.t_cost,
        params.p_cost,
        Some(params.output_len),
    )
    .map_err(|e| HashError::InvalidParams(e.to_string()))
}

impl Hasher for KdfHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let params = build_params(&self.params)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut output = Zeroizing::new(vec![0u8; self.params.output_len]);
        argon2
            .hash_password_into(plaintext.as_bytes(), &self.salt, &mut output)
            .map_err(|e| HashError::ResourceExhaustion(e.to_string()))?;

        Ok(hex::encode(output.as_slice()))
    }
}

impl fmt::Debug for KdfHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KdfHasher")
            .field("salt", &"[REDACTED]")
            .field("params", &self.params)
            .finish()
    }
}

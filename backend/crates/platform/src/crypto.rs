//! Cryptographic Utilities
//!
//! Keyed hashing and comparison helpers shared by the credential hasher
//! and the token fingerprinter.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use zeroize::Zeroizing;

use crate::password::{HashError, Hasher};

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Constant-time comparison to prevent timing attacks
///
/// Runs over the longer input so a length mismatch costs the same as a
/// content mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = a.len() ^ b.len();
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(x ^ y);
    }
    diff == 0
}

// ============================================================================
// Token Fingerprinter
// ============================================================================

/// Keyed HMAC-SHA256 fingerprinter for bearer tokens
///
/// Token fingerprints are computed on every authenticated request, so this
/// implements the [`Hasher`] capability with a cheap keyed hash instead of the
/// memory-hard KDF used for passwords. Tokens are high-entropy signed values;
/// the key (process-wide salt) keeps fingerprints unlinkable to the raw token
/// for anyone reading the cache.
pub struct HmacFingerprinter {
    key: Zeroizing<Vec<u8>>,
}

impl HmacFingerprinter {
    pub fn new(key: &[u8]) -> Self {
        Self {
            key: Zeroizing::new(key.to_vec()),
        }
    }
}

impl Hasher for HmacFingerprinter {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        Ok(hex::encode(hmac_sha256(&self.key, plaintext.as_bytes())))
    }
}

impl fmt::Debug for HmacFingerprinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacFingerprinter")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

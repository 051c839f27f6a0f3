//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, constant-time equality)
//! - Credential hashing (Argon2id KDF with a process-wide salt)
//! - Token fingerprinting (keyed HMAC behind the same `Hasher` capability)
//! - Revocation store abstraction with in-memory and Redis backends
//! - Configuration primitives (duration strings, secret length checks)

pub mod cache;
pub mod config;
pub mod crypto;
pub mod password;

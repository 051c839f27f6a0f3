//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of the forum's vocabulary:
//! - Common error types and result aliases
//! - Typed identifiers for forum entities
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all modules.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;

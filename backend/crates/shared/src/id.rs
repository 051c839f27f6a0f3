//! Common ID Types
//!
//! Type-safe, opaque string IDs for forum entities.
//! New IDs are nanoids; existing IDs (from the database or a token subject)
//! are accepted as long as they fit the storage column.

use nid::Nanoid;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Maximum stored length of an ID (`VARCHAR(50)`)
pub const MAX_ID_LENGTH: usize = 50;

/// Error when parsing an ID from an untrusted string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("ID cannot be empty")]
    Empty,
    #[error("ID must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },
    #[error("ID cannot contain whitespace")]
    Whitespace,
}

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type UserId = Id<markers::User>;
///
/// let id = UserId::generate();
/// assert_eq!(UserId::parse(id.as_str()).unwrap(), id);
/// ```
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Create a new random ID (21-char nanoid)
    pub fn generate() -> Self {
        let nanoid: Nanoid = Nanoid::new();
        Self {
            value: nanoid.to_string(),
            _marker: PhantomData,
        }
    }

    /// Parse an existing ID
    pub fn parse(raw: impl Into<String>) -> Result<Self, IdError> {
        let value = raw.into();
        if value.is_empty() {
            return Err(IdError::Empty);
        }
        let actual = value.chars().count();
        if actual > MAX_ID_LENGTH {
            return Err(IdError::TooLong {
                max: MAX_ID_LENGTH,
                actual,
            });
        }
        if value.chars().any(char::is_whitespace) {
            return Err(IdError::Whitespace);
        }
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

// Manual impls: markers are plain unit structs without derives.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    /// Marker for User IDs
    pub struct User;
}

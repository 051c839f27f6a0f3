//! User Name Value Object
//!
//! ユーザー名はログインと表示に使う公開ハンドル。
//!
//! ## 設計方針
//! - NFKC正規化 → trim → 小文字化 の順で処理
//! - 正規形は `^[a-z0-9][a-z0-9_]+$`
//! - 一意性は正規形で判定する（DB の UNIQUE 制約）
//!
//! ## 不変条件
//! - 長さ: 3〜50文字（正規化後）
//! - 先頭: 英小文字または数字

use std::fmt;

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 50;

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("User name cannot be empty")]
    Empty,

    #[error("User name is too short ({length} chars, minimum {min})")]
    TooShort { length: usize, min: usize },

    #[error("User name is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error("User name cannot start with '{char}'. Must start with a-z or 0-9")]
    InvalidStart { char: char },

    #[error("Invalid character '{char}' at position {position}. Only a-z, 0-9 and _ are allowed")]
    InvalidCharacter { char: char, position: usize },
}

/// Validated, normalized (lowercase) user name
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UserName(String);

impl UserName {
    /// Normalize and validate raw input
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let canonical = Self::normalize(input.as_ref());
        Self::validate(&canonical)?;
        Ok(Self(canonical))
    }

    /// Create from database values (assumes already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    fn normalize(input: &str) -> String {
        input.nfkc().collect::<String>().trim().to_lowercase()
    }

    fn validate(canonical: &str) -> Result<(), UserNameError> {
        let mut chars = canonical.chars();
        let Some(first) = chars.next() else {
            return Err(UserNameError::Empty);
        };

        let length = canonical.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if !(first.is_ascii_lowercase() || first.is_ascii_digit()) {
            return Err(UserNameError::InvalidStart { char: first });
        }

        for (offset, ch) in chars.enumerate() {
            if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_') {
                return Err(UserNameError::InvalidCharacter {
                    char: ch,
                    position: offset + 1,
                });
            }
        }

        Ok(())
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.0).finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

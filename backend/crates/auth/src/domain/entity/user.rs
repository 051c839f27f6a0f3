//! User Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::{password::PasswordDigest, user_id::UserId, user_name::UserName};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Opaque identifier (nanoid)
    pub id: UserId,
    /// User name (unique, lowercase)
    pub user_name: UserName,
    /// Password digest
    pub password: PasswordDigest,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh id
    pub fn new(user_name: UserName, password: PasswordDigest) -> Self {
        let now = Utc::now();

        Self {
            id: UserId::generate(),
            user_name,
            password,
            created_at: now,
            updated_at: now,
        }
    }
}

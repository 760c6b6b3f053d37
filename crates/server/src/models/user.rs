//! User entity.

use chrono::{DateTime, Utc};
use serde::Serialize;

use vendora_core::{Email, Role, UserId, Username};

/// A registered account.
///
/// The password hash never leaves the server; route responses use
/// [`UserProfile`] instead of serializing this struct directly.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub is_verified: bool,
    pub join_date: DateTime<Utc>,
    pub role: Role,
}

/// Public profile fields of a [`User`].
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub is_verified: bool,
    pub join_date: DateTime<Utc>,
    pub role: Role,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_verified: user.is_verified,
            join_date: user.join_date,
            role: user.role,
        }
    }
}

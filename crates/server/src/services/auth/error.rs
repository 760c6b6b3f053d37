//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::error::AppError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username fails the registration format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] vendora_core::UsernameError),

    /// Email fails basic structure validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] vendora_core::EmailError),

    /// Password too weak.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Username or email already registered.
    #[error("{0}")]
    Duplicate(String),

    /// Wrong username or password.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// Token undecodable, tampered, expired, or already consumed.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Token decoded but references no user.
    #[error("user not found")]
    UserNotFound,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidUsername(err) => Self::Validation(err.to_string()),
            AuthError::InvalidEmail(err) => Self::Validation(err.to_string()),
            AuthError::WeakPassword(msg) | AuthError::Duplicate(msg) => Self::Validation(msg),
            AuthError::InvalidCredentials => {
                Self::Auth("Incorrect username or password".to_owned())
            }
            AuthError::InvalidToken => Self::Auth("Invalid token or expired token".to_owned()),
            AuthError::UserNotFound => Self::Auth("User not found".to_owned()),
            AuthError::PasswordHash => Self::Internal("password hashing error".to_owned()),
            AuthError::Repository(err) => err.into(),
        }
    }
}

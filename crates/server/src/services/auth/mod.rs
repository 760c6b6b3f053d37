//! Authentication service.
//!
//! Owns password hashing, credential validation, and the signed bearer
//! tokens that stand for a session. The same token shape backs both the
//! login session and the email-verification link.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use vendora_core::{Email, Role, UserId, Username};

use crate::config::ServerConfig;
use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Characters counted as "special" for password strength.
const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Signed bearer token payload.
///
/// The `{id, username}` pair is the whole session; `exp` bounds its
/// lifetime (configurable, 24h by default).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub username: String,
    pub exp: i64,
}

/// Authentication service.
///
/// Handles registration, login, token issue/verification, and email
/// verification.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    jwt_secret: &'a SecretString,
    token_ttl_hours: i64,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, config: &'a ServerConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt_secret: &config.jwt_secret,
            token_ttl_hours: config.token_ttl_hours,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername`/`InvalidEmail`/`WeakPassword`
    /// if a field fails validation, `AuthError::Duplicate` if the
    /// username or email is already registered.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&username, &email, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => AuthError::Duplicate(msg),
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with username and password, returning the user and a fresh
    /// bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is
    /// unknown or the password doesn't match.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), AuthError> {
        let user = self
            .users
            .get_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Issue a signed bearer token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` on a signing failure, which is
    /// effectively unreachable with an HMAC key.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let exp = (Utc::now() + Duration::hours(self.token_ttl_hours)).timestamp();
        let claims = Claims {
            id: user.id.as_i32(),
            username: user.username.as_str().to_owned(),
            exp,
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.expose_secret().as_bytes()),
        )
        .map_err(|_| AuthError::InvalidToken)
    }

    /// Decode and validate a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed,
    /// wrongly signed, or expired.
    pub fn decode_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.expose_secret().as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        Ok(data.claims)
    }

    /// Resolve a bearer token to its user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for a bad token and
    /// `AuthError::UserNotFound` if the id no longer exists.
    pub async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.decode_token(token)?;
        self.users
            .get_by_id(UserId::new(claims.id))
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Consume an email-verification token, marking the user verified.
    ///
    /// A token for an already-verified user is rejected like a bad one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is invalid or the
    /// user is already verified.
    pub async fn verify_email(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.decode_token(token)?;
        let user = self
            .users
            .get_by_id(UserId::new(claims.id))
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if user.is_verified {
            return Err(AuthError::InvalidToken);
        }

        self.users.set_verified(user.id).await?;

        Ok(User {
            is_verified: true,
            ..user
        })
    }
}

// =============================================================================
// Password helpers
// =============================================================================

/// Validate password strength.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` unless the password is at least 8
/// characters with an uppercase letter, a lowercase letter, a digit,
/// and a special character.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| SPECIAL_CHARACTERS.contains(c));

    if password.len() >= MIN_PASSWORD_LENGTH && has_upper && has_lower && has_digit && has_special {
        Ok(())
    } else {
        Err(AuthError::WeakPassword(
            "Password must be at least 8 characters long and contain at least one uppercase \
             letter, one lowercase letter, one digit, and one special character"
                .to_owned(),
        ))
    }
}

/// Hash a password with argon2 and a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch and
/// `AuthError::PasswordHash` if the stored hash is unparseable.
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(password_hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use std::path::PathBuf;

    fn test_config() -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/unused"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            base_url: "http://localhost:8000".to_owned(),
            jwt_secret: SecretString::from("4fYm2sQ8vK1wL9xD3cR7pN5tH0jB6gZa"),
            token_ttl_hours: 24,
            static_dir: PathBuf::from("./static"),
            email: None,
            sentry_dsn: None,
        }
    }

    fn test_user() -> User {
        User {
            id: UserId::new(1),
            username: Username::parse("alice01").unwrap(),
            email: Email::parse("alice@example.com").unwrap(),
            password_hash: String::new(),
            is_verified: false,
            join_date: Utc::now(),
            role: Role::Customer,
        }
    }

    #[test]
    fn test_validate_password_accepts_strong() {
        assert!(validate_password("Str0ng!Pass").is_ok());
    }

    #[test]
    fn test_validate_password_rejects_weak() {
        // too short
        assert!(validate_password("S0r!t").is_err());
        // missing uppercase
        assert!(validate_password("weak0!pass").is_err());
        // missing digit
        assert!(validate_password("Weakness!").is_err());
        // missing special character
        assert!(validate_password("Weakness0").is_err());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Str0ng!Pass").unwrap();
        assert!(verify_password("Str0ng!Pass", &hash).is_ok());
        assert!(matches!(
            verify_password("Wr0ng!Pass", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("Str0ng!Pass").unwrap();
        let b = hash_password("Str0ng!Pass").unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_token_roundtrip() {
        let config = test_config();
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let auth = AuthService::new(&pool, &config);

        let token = auth.issue_token(&test_user()).unwrap();
        let claims = auth.decode_token(&token).unwrap();
        assert_eq!(claims.id, 1);
        assert_eq!(claims.username, "alice01");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[tokio::test]
    async fn test_tampered_token_is_rejected() {
        let config = test_config();
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let auth = AuthService::new(&pool, &config);

        let mut token = auth.issue_token(&test_user()).unwrap();
        token.push('x');
        assert!(matches!(
            auth.decode_token(&token),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            auth.decode_token("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }
}

//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! VENDORA_ADMIN_PASSWORD='Str0ng!Pass' vendora admin create \
//!     -u site_admin -e admin@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `VENDORA_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to `DATABASE_URL`)
//! - `VENDORA_ADMIN_PASSWORD` - password for the new admin; validated
//!   with the same strength rules as registration

use sqlx::PgPool;
use thiserror::Error;

use vendora_core::{Email, Role, Username};
use vendora_server::db::{RepositoryError, UserRepository};
use vendora_server::services::auth;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid username.
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] vendora_core::UsernameError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] vendora_core::EmailError),

    /// Weak password or hashing failure.
    #[error("Password rejected: {0}")]
    Password(#[from] auth::AuthError),

    /// User already exists.
    #[error("{0}")]
    UserExists(String),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

/// Create a new admin user.
///
/// # Arguments
///
/// * `username` - Admin's login handle
/// * `email` - Admin's email address
///
/// # Returns
///
/// The ID of the created admin user.
///
/// # Errors
///
/// Returns `AdminError` if validation fails, the user already exists,
/// or the database is unreachable.
pub async fn create_user(username: &str, email: &str) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let username = Username::parse(username)?;
    let email = Email::parse(email)?;

    let password = std::env::var("VENDORA_ADMIN_PASSWORD")
        .map_err(|_| AdminError::MissingEnvVar("VENDORA_ADMIN_PASSWORD"))?;
    auth::validate_password(&password)?;
    let password_hash = auth::hash_password(&password)?;

    let database_url = std::env::var("VENDORA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AdminError::MissingEnvVar("VENDORA_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Creating admin user: {} ({})", username, email);
    let user = UserRepository::new(&pool)
        .create(&username, &email, &password_hash, Role::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => AdminError::UserExists(msg),
            other => AdminError::Repository(other),
        })?;

    tracing::info!("Admin user created with id {}", user.id);
    Ok(user.id.as_i32())
}

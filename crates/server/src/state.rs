//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::email::EmailService;
use crate::services::images::ImageStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    mailer: Option<EmailService>,
    images: ImageStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The mailer is only constructed when SMTP is configured;
    /// registration works without it, just without verification email.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay configuration is invalid.
    pub fn new(
        config: ServerConfig,
        pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let mailer = config.email.as_ref().map(EmailService::new).transpose()?;
        let images = ImageStore::new(config.images_dir());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                mailer,
                images,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the mailer, if SMTP is configured.
    #[must_use]
    pub fn mailer(&self) -> Option<&EmailService> {
        self.inner.mailer.as_ref()
    }

    /// Get a reference to the image store.
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }
}

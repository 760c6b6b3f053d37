//! Business repository for database operations.

use sqlx::PgPool;

use vendora_core::{BusinessId, UserId};

use super::RepositoryError;
use crate::models::Business;
use crate::models::business::DEFAULT_BUSINESS_NAME;

const BUSINESS_COLUMNS: &str = "id, name, city, region, description, logo, owner_id";

/// Fields for creating or updating a business.
#[derive(Debug, Clone)]
pub struct BusinessInput {
    pub name: String,
    pub city: String,
    pub region: String,
    pub description: Option<String>,
}

/// Repository for business database operations.
pub struct BusinessRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BusinessRepository<'a> {
    /// Create a new business repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a business owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken,
    /// `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        input: &BusinessInput,
        owner_id: UserId,
    ) -> Result<Business, RepositoryError> {
        sqlx::query_as::<_, Business>(&format!(
            "INSERT INTO businesses (name, city, region, description, owner_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {BUSINESS_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.region)
        .bind(&input.description)
        .bind(owner_id)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)
    }

    /// Get a business by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BusinessId) -> Result<Option<Business>, RepositoryError> {
        let business = sqlx::query_as::<_, Business>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(business)
    }

    /// Get the sentinel default business, if it has been created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_default(&self) -> Result<Option<Business>, RepositoryError> {
        let business = sqlx::query_as::<_, Business>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE name = $1 AND owner_id IS NULL"
        ))
        .bind(DEFAULT_BUSINESS_NAME)
        .fetch_optional(self.pool)
        .await?;

        Ok(business)
    }

    /// Get the sentinel default business, creating it if absent.
    ///
    /// Creation is idempotent under concurrency: the insert ignores a
    /// name conflict and the follow-up select returns whichever row won.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if the sentinel row has
    /// acquired an owner.
    pub async fn ensure_default(&self) -> Result<Business, RepositoryError> {
        sqlx::query(
            "INSERT INTO businesses (name, city, region, description) \
             VALUES ($1, 'Unspecified', 'Unspecified', \
                     'Default business entity for products without specified business') \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(DEFAULT_BUSINESS_NAME)
        .execute(self.pool)
        .await?;

        self.get_default().await?.ok_or_else(|| {
            RepositoryError::DataCorruption("default business row is owned".to_owned())
        })
    }

    /// List the businesses owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Business>, RepositoryError> {
        let businesses = sqlx::query_as::<_, Business>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE owner_id = $1 ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;

        Ok(businesses)
    }

    /// Update a business's descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the business doesn't exist,
    /// `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: BusinessId,
        input: &BusinessInput,
    ) -> Result<Business, RepositoryError> {
        sqlx::query_as::<_, Business>(&format!(
            "UPDATE businesses \
             SET name = $2, city = $3, region = $4, description = $5 \
             WHERE id = $1 \
             RETURNING {BUSINESS_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.region)
        .bind(&input.description)
        .fetch_optional(self.pool)
        .await
        .map_err(map_unique_violation)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Persist a new logo filename.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the business doesn't exist.
    pub async fn set_logo(&self, id: BusinessId, logo: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE businesses SET logo = $2 WHERE id = $1")
            .bind(id)
            .bind(logo)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a business.
    ///
    /// Callers enforce the reject-if-nonempty rule before calling this;
    /// the row itself cascades nothing the caller hasn't checked.
    ///
    /// # Returns
    ///
    /// Returns `true` if the business was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: BusinessId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM businesses WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("Business name already exists".to_owned());
    }
    RepositoryError::Database(e)
}

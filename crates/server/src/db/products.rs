//! Product repository for database operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use vendora_core::{BusinessId, ProductId};

use super::RepositoryError;
use crate::models::Product;

pub(crate) const PRODUCT_COLUMNS: &str = "id, name, category, original_price, new_price, \
     percentage_discount, offer_expiration_date, product_image, date_published, quantity, \
     business_id";

/// Fields for creating or updating a product.
///
/// `percentage_discount` is always supplied by the caller, derived from
/// the two prices; it is never accepted from the wire.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub original_price: Decimal,
    pub new_price: Decimal,
    pub percentage_discount: Decimal,
    pub offer_expiration_date: NaiveDate,
    pub quantity: i32,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product under a business.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        input: &ProductInput,
        business_id: BusinessId,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products \
             (name, category, original_price, new_price, percentage_discount, \
              offer_expiration_date, quantity, business_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.original_price)
        .bind(input.new_price)
        .bind(input.percentage_discount)
        .bind(input.offer_expiration_date)
        .bind(input.quantity)
        .bind(business_id)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// List products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// List the products of one business.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_business(
        &self,
        business_id: BusinessId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE business_id = $1 ORDER BY id"
        ))
        .bind(business_id)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Number of products attached to a business.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_business(&self, business_id: BusinessId) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE business_id = $1")
                .bind(business_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }

    /// Update a product's catalog fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products \
             SET name = $2, category = $3, original_price = $4, new_price = $5, \
                 percentage_discount = $6, offer_expiration_date = $7, quantity = $8 \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.original_price)
        .bind(input.new_price)
        .bind(input.percentage_discount)
        .bind(input.offer_expiration_date)
        .bind(input.quantity)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Persist a new product image filename.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_image(&self, id: ProductId, image: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE products SET product_image = $2 WHERE id = $1")
            .bind(id)
            .bind(image)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

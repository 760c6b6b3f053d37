//! Order repository for database operations.
//!
//! Plain CRUD lives here; the order-creation critical section (stock
//! check + decrement + insert under one row-locked transaction) is in
//! [`crate::services::orders::OrderService`].

use sqlx::PgPool;

use vendora_core::{OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::Order;

const ORDER_COLUMNS: &str =
    "id, product_id, user_id, quantity, order_date, total_price, status";

/// An order joined with the owner of the business selling its product.
///
/// Used by the status-update authorization check: a business owner may
/// only move orders whose product belongs to one of their businesses.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderWithSeller {
    #[sqlx(flatten)]
    pub order: Order,
    /// Owner of the business that owns the order's product; `None` when
    /// the product hangs off the ownerless default business.
    pub seller_id: Option<UserId>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Get an order together with the selling business's owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_seller(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithSeller>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderWithSeller>(
            "SELECT o.id, o.product_id, o.user_id, o.quantity, o.order_date, \
                    o.total_price, o.status, b.owner_id AS seller_id \
             FROM orders o \
             JOIN products p ON p.id = o.product_id \
             JOIN businesses b ON b.id = p.business_id \
             WHERE o.id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// List a buyer's orders, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_buyer(
        &self,
        buyer_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 \
             ORDER BY id LIMIT $2 OFFSET $3"
        ))
        .bind(buyer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List all orders, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Update an order's quantity.
    ///
    /// Deliberately leaves `total_price` and product stock untouched:
    /// the total is a creation-time snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_quantity(
        &self,
        id: OrderId,
        quantity: i32,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET quantity = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an order owned by `buyer_id`.
    ///
    /// Does not restock the product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the order existed and belonged to the buyer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_for_buyer(
        &self,
        id: OrderId,
        buyer_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(buyer_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

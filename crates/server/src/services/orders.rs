//! Order workflow service.
//!
//! Owns the order-creation critical section and the ownership rules for
//! status, quantity, and deletion updates.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use vendora_core::{OrderId, OrderStatus, ProductId, UserId, order_total};

use crate::db::orders::OrderRepository;
use crate::db::products::PRODUCT_COLUMNS;
use crate::db::RepositoryError;
use crate::error::AppError;
use crate::models::{Order, Product};

/// Errors that can occur in the order workflow.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Ordered product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// Order does not exist.
    #[error("order not found")]
    OrderNotFound,

    /// Product has no stock at all.
    #[error("product out of stock")]
    OutOfStock,

    /// Requested more units than are in stock.
    #[error("insufficient stock: {available} available")]
    InsufficientStock {
        /// Units currently in stock.
        available: i32,
    },

    /// Requested quantity below one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Caller does not own the business selling the product.
    #[error("caller is not the seller")]
    NotSeller,

    /// Caller is not the order's buyer.
    #[error("caller is not the buyer")]
    NotBuyer,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::ProductNotFound => Self::NotFound("Product not found".to_owned()),
            OrderError::OrderNotFound => Self::NotFound("Order not found".to_owned()),
            OrderError::OutOfStock => Self::Validation("Product out of stock".to_owned()),
            OrderError::InsufficientStock { available } => Self::Validation(format!(
                "Not enough stock: only {available} left"
            )),
            OrderError::InvalidQuantity => {
                Self::Validation("Order quantity must be at least 1".to_owned())
            }
            OrderError::NotSeller => Self::Forbidden(
                "Only the owner of the business can update the status of orders related to \
                 their products"
                    .to_owned(),
            ),
            OrderError::NotBuyer => {
                Self::Forbidden("You can only modify your own orders".to_owned())
            }
            OrderError::Repository(err) => err.into(),
        }
    }
}

/// Order workflow service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order: the product lookup, stock check, price snapshot,
    /// stock decrement, and order insert run as one transaction with the
    /// product row locked, so concurrent orders against the same product
    /// serialize and a failed insert rolls the decrement back.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::ProductNotFound`, `OutOfStock` (stock is
    /// zero), `InsufficientStock` (requested more than available), or
    /// `InvalidQuantity` (requested less than one).
    pub async fn create(
        &self,
        buyer_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Order, OrderError> {
        if quantity < 1 {
            return Err(OrderError::InvalidQuantity);
        }

        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
        ))
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(OrderError::ProductNotFound)?;

        if product.quantity < 1 {
            return Err(OrderError::OutOfStock);
        }
        if quantity > product.quantity {
            return Err(OrderError::InsufficientStock {
                available: product.quantity,
            });
        }

        let total_price: Decimal = order_total(product.new_price, quantity);

        sqlx::query("UPDATE products SET quantity = quantity - $2 WHERE id = $1")
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (product_id, user_id, quantity, total_price, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, product_id, user_id, quantity, order_date, total_price, status",
        )
        .bind(product_id)
        .bind(buyer_id)
        .bind(quantity)
        .bind(total_price)
        .bind(OrderStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(order)
    }

    /// Set an order's status on behalf of a business owner.
    ///
    /// The caller must own the business that owns the order's product.
    /// Any target status is accepted; the transition function is open.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` or `OrderError::NotSeller`.
    pub async fn update_status_as_seller(
        &self,
        caller_id: UserId,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let row = self
            .orders
            .get_with_seller(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        if row.seller_id != Some(caller_id) {
            return Err(OrderError::NotSeller);
        }

        debug_assert!(row.order.status.can_transition(status));

        Ok(self.orders.update_status(order_id, status).await?)
    }

    /// Set an order's status with admin authority (no ownership check).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order doesn't exist.
    pub async fn update_status_as_admin(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        self.orders
            .update_status(order_id, status)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => OrderError::OrderNotFound,
                other => OrderError::Repository(other),
            })
    }

    /// Update the quantity of the caller's own order.
    ///
    /// Leaves `total_price` and product stock untouched: the total is a
    /// creation-time snapshot.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound`, `NotBuyer`, or
    /// `InvalidQuantity`.
    pub async fn update_quantity(
        &self,
        caller_id: UserId,
        order_id: OrderId,
        quantity: i32,
    ) -> Result<Order, OrderError> {
        if quantity < 1 {
            return Err(OrderError::InvalidQuantity);
        }

        let order = self
            .orders
            .get_by_id(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        if order.user_id != caller_id {
            return Err(OrderError::NotBuyer);
        }

        Ok(self.orders.update_quantity(order_id, quantity).await?)
    }

    /// Delete the caller's own order. Does not restock the product.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` when the order doesn't exist
    /// or belongs to someone else, matching the delete contract.
    pub async fn delete(&self, caller_id: UserId, order_id: OrderId) -> Result<(), OrderError> {
        let deleted = self.orders.delete_for_buyer(order_id, caller_id).await?;
        if deleted {
            Ok(())
        } else {
            Err(OrderError::OrderNotFound)
        }
    }

    /// List the caller's own orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_for_buyer(
        &self,
        buyer_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_by_buyer(buyer_id, limit, offset).await?)
    }
}

//! Order entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use vendora_core::{OrderId, OrderStatus, ProductId, UserId};

/// A customer's purchase of a single product.
///
/// `total_price` is a snapshot of `new_price x quantity` taken at
/// creation; later product price changes never touch it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub quantity: i32,
    pub order_date: DateTime<Utc>,
    pub total_price: Decimal,
    pub status: OrderStatus,
}

//! Product entity.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use vendora_core::{BusinessId, ProductId};

/// A catalog item belonging to a business.
///
/// `percentage_discount` is derived from the two prices at every write
/// and stored denormalized; `quantity` is the stock counter decremented
/// by order creation and never goes negative.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub original_price: Decimal,
    pub new_price: Decimal,
    pub percentage_discount: Decimal,
    pub offer_expiration_date: NaiveDate,
    pub product_image: String,
    pub date_published: NaiveDate,
    pub quantity: i32,
    pub business_id: BusinessId,
}

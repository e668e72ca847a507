//! Product domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use farmlink_core::{CategoryId, ProductId, UserId};

/// A product listed for sale.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name (unique).
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Category this product belongs to.
    pub category_id: CategoryId,
    /// Available sizes.
    pub sizes: Vec<String>,
    /// Available colors.
    pub colors: Vec<String>,
    /// Externally hosted image URLs.
    pub images: Vec<String>,
    /// Unit price in the store currency's standard unit.
    pub price: Decimal,
    /// Quantity available.
    pub total_qty: i32,
    /// Units sold so far. Only ever increases.
    pub total_sold: i32,
    /// User who listed the product.
    pub user_id: UserId,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

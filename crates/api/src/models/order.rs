//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use farmlink_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::user::ShippingAddress;

/// An order created at checkout.
///
/// `total_price` is fixed at creation using the coupon discount at that
/// moment; it is never recomputed. Status is the only field mutated
/// afterwards, exclusively by the fulfillment flow.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Human-facing order number (e.g. `ORD-4F7K2M9QX1`).
    pub order_number: String,
    /// User who placed the order.
    pub user_id: UserId,
    /// Line items, in submission order.
    pub items: Vec<OrderItem>,
    /// Shipping address snapshot taken at checkout.
    pub shipping_address: ShippingAddress,
    /// Post-discount total.
    pub total_price: Decimal,
    /// Fulfillment status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// One line of an order, with a unit-price snapshot.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    /// Unique line-item ID.
    pub id: OrderItemId,
    /// Product reference; `None` once the product has been deleted.
    pub product_id: Option<ProductId>,
    /// Product name at purchase time.
    pub name: String,
    /// Product description at purchase time.
    pub description: Option<String>,
    /// Quantity ordered.
    pub qty: i32,
    /// Unit price at purchase time.
    pub unit_price: Decimal,
}

impl OrderItem {
    /// Line total (`unit_price × qty`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.qty)
    }
}

//! Order checkout orchestration.
//!
//! The one multi-step flow in the system: validate the coupon, compute the
//! discounted total, persist the order, bump product sale counters, and
//! create the hosted payment session. Steps after the order insert are not
//! rolled back on failure; the order stays `pending` until fulfillment
//! moves it along.

use chrono::{DateTime, Utc};
use rand::Rng as _;
use rand::distr::Alphanumeric;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use farmlink_core::{ProductId, UserId, to_minor_units};

use crate::db::orders::NewOrderItem;
use crate::db::{
    CouponRepository, OrderRepository, ProductRepository, RepositoryError, UserRepository,
};
use crate::models::coupon::Coupon;
use crate::models::order::Order;
use crate::models::user::ShippingAddress;
use crate::services::stripe::{LineItem, StripeClient, StripeError};

/// Length of the random part of an order number.
const ORDER_NUMBER_LENGTH: usize = 10;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The supplied coupon code does not exist.
    #[error("coupon {0} does not exist")]
    CouponNotFound(String),

    /// The supplied coupon is outside its validity window.
    #[error("coupon {0} is expired")]
    CouponExpired(String),

    /// The buyer has no shipping address on file.
    #[error("shipping address is required")]
    MissingShippingAddress,

    /// No order items were supplied.
    #[error("no order items found")]
    EmptyOrder,

    /// An item has a non-positive quantity.
    #[error("invalid quantity {qty} for {name}")]
    InvalidQuantity { name: String, qty: i32 },

    /// An item's price cannot be expressed in minor currency units.
    #[error("invalid price for {0}")]
    InvalidPrice(String),

    /// The buyer account does not exist.
    #[error("user not found")]
    BuyerNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Payment provider error.
    #[error("payment error: {0}")]
    Payment(#[from] StripeError),
}

/// One requested order line, with the price snapshot taken from the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRequest {
    /// Product being ordered, if it still exists in the catalog.
    pub product_id: Option<ProductId>,
    pub name: String,
    pub description: Option<String>,
    pub qty: i32,
    pub price: Decimal,
}

/// Result of a successful checkout.
#[derive(Debug)]
pub struct CheckoutOutcome {
    /// The persisted order.
    pub order: Order,
    /// Hosted payment page to redirect the buyer to.
    pub payment_url: String,
}

/// Checkout orchestrator.
pub struct CheckoutService<'a> {
    users: UserRepository<'a>,
    coupons: CouponRepository<'a>,
    products: ProductRepository<'a>,
    orders: OrderRepository<'a>,
    stripe: &'a StripeClient,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, stripe: &'a StripeClient) -> Self {
        Self {
            users: UserRepository::new(pool),
            coupons: CouponRepository::new(pool),
            products: ProductRepository::new(pool),
            orders: OrderRepository::new(pool),
            stripe,
        }
    }

    /// Place an order for `buyer`.
    ///
    /// The order snapshots `shipping_override` when supplied, else the
    /// buyer's address on file; either way the buyer must have an address
    /// on file.
    ///
    /// Side effects, in order: order row created, product `total_sold`
    /// counters bumped, external payment session created. There is no
    /// rollback if a later step fails.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`]; validation failures happen before anything is
    /// written.
    pub async fn place_order(
        &self,
        buyer: UserId,
        items: Vec<OrderItemRequest>,
        shipping_override: Option<ShippingAddress>,
        coupon_code: Option<&str>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let now = Utc::now();

        let discount = match coupon_code {
            Some(raw) => Some(self.lookup_discount(raw, now).await?),
            None => None,
        };

        let user = self
            .users
            .get_by_id(buyer)
            .await?
            .ok_or(CheckoutError::BuyerNotFound)?;

        let Some(on_file) = user.shipping_address else {
            return Err(CheckoutError::MissingShippingAddress);
        };
        let address = shipping_override.unwrap_or(on_file);

        validate_items(&items)?;

        let total_price = apply_discount(raw_total(&items), discount);

        let new_items: Vec<NewOrderItem> = items
            .into_iter()
            .map(|item| NewOrderItem {
                product_id: item.product_id,
                name: item.name,
                description: item.description,
                qty: item.qty,
                unit_price: item.price,
            })
            .collect();

        let order = self
            .orders
            .create(
                user.id,
                &generate_order_number(),
                &address,
                total_price,
                &new_items,
            )
            .await?;

        // Best-effort per item: a product deleted since the cart was built
        // is skipped, not fatal.
        for item in &order.items {
            if let Some(product_id) = item.product_id {
                let touched = self
                    .products
                    .increment_total_sold(product_id, item.qty)
                    .await?;
                if touched == 0 {
                    tracing::debug!(%product_id, "ordered product no longer exists, skipping counter");
                }
            }
        }

        let line_items = order
            .items
            .iter()
            .map(|item| {
                let unit_amount = to_minor_units(item.unit_price)
                    .ok_or_else(|| CheckoutError::InvalidPrice(item.name.clone()))?;
                Ok(LineItem {
                    name: item.name.clone(),
                    description: item.description.clone(),
                    unit_amount,
                    quantity: i64::from(item.qty),
                })
            })
            .collect::<Result<Vec<_>, CheckoutError>>()?;

        let session = self
            .stripe
            .create_checkout_session(&line_items, order.id, user.id)
            .await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total_price,
            "order placed"
        );

        Ok(CheckoutOutcome {
            order,
            payment_url: session.url,
        })
    }

    /// Resolve a coupon code to a discount fraction.
    async fn lookup_discount(
        &self,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<Decimal, CheckoutError> {
        let code = farmlink_core::CouponCode::parse(raw)
            .map_err(|_| CheckoutError::CouponNotFound(raw.to_owned()))?;

        let coupon = self
            .coupons
            .get_by_code(&code)
            .await?
            .ok_or_else(|| CheckoutError::CouponNotFound(code.to_string()))?;

        coupon_discount(&coupon, now)
    }
}

/// Discount fraction for a coupon, or `CouponExpired` outside its window.
fn coupon_discount(coupon: &Coupon, now: DateTime<Utc>) -> Result<Decimal, CheckoutError> {
    if !coupon.is_redeemable(now) {
        return Err(CheckoutError::CouponExpired(coupon.code.to_string()));
    }
    Ok(coupon.discount_fraction())
}

/// Reject empty orders and non-positive quantities before any write.
fn validate_items(items: &[OrderItemRequest]) -> Result<(), CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }
    for item in items {
        if item.qty <= 0 {
            return Err(CheckoutError::InvalidQuantity {
                name: item.name.clone(),
                qty: item.qty,
            });
        }
    }
    Ok(())
}

/// Pre-discount total: `Σ price × qty`.
fn raw_total(items: &[OrderItemRequest]) -> Decimal {
    items
        .iter()
        .map(|item| item.price * Decimal::from(item.qty))
        .sum()
}

/// `raw × (1 − discount)` when a coupon applied, else `raw`.
fn apply_discount(raw: Decimal, discount: Option<Decimal>) -> Decimal {
    match discount {
        Some(fraction) => raw - raw * fraction,
        None => raw,
    }
}

/// Random human-facing order number, e.g. `ORD-4F7K2M9QX1`.
fn generate_order_number() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_NUMBER_LENGTH)
        .map(char::from)
        .collect();
    format!("ORD-{}", suffix.to_uppercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use farmlink_core::{CouponCode, CouponId};

    fn item(name: &str, qty: i32, price: Decimal) -> OrderItemRequest {
        OrderItemRequest {
            product_id: Some(ProductId::new(1)),
            name: name.to_owned(),
            description: None,
            qty,
            price,
        }
    }

    fn save10(start: DateTime<Utc>, end: DateTime<Utc>) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            code: CouponCode::parse("SAVE10").unwrap(),
            discount: Decimal::new(10, 0),
            start_date: start,
            end_date: end,
            user_id: UserId::new(1),
            created_at: start,
        }
    }

    #[test]
    fn test_coupon_discount_within_window() {
        let now = Utc::now();
        let coupon = save10(now - Duration::days(1), now + Duration::days(1));
        assert_eq!(coupon_discount(&coupon, now).unwrap(), Decimal::new(1, 1));
    }

    #[test]
    fn test_coupon_discount_expired() {
        let now = Utc::now();
        let coupon = save10(now - Duration::days(10), now - Duration::days(1));
        assert!(matches!(
            coupon_discount(&coupon, now),
            Err(CheckoutError::CouponExpired(code)) if code == "SAVE10"
        ));
    }

    #[test]
    fn test_coupon_discount_not_yet_valid() {
        let now = Utc::now();
        let coupon = save10(now + Duration::days(1), now + Duration::days(10));
        assert!(matches!(
            coupon_discount(&coupon, now),
            Err(CheckoutError::CouponExpired(_))
        ));
    }

    #[test]
    fn test_ten_percent_off_hundred_is_ninety() {
        let items = vec![item("Apples", 4, Decimal::new(25, 0))];
        let raw = raw_total(&items);
        assert_eq!(raw, Decimal::new(100, 0));

        let total = apply_discount(raw, Some(Decimal::new(1, 1)));
        assert_eq!(total, Decimal::new(90, 0));
    }

    #[test]
    fn test_no_coupon_keeps_raw_total() {
        let items = vec![
            item("Eggs", 2, Decimal::new(450, 2)),
            item("Butter", 1, Decimal::new(700, 2)),
        ];
        let raw = raw_total(&items);
        assert_eq!(raw, Decimal::new(1600, 2));
        assert_eq!(apply_discount(raw, None), raw);
    }

    #[test]
    fn test_empty_order_rejected() {
        assert!(matches!(
            validate_items(&[]),
            Err(CheckoutError::EmptyOrder)
        ));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let items = vec![item("Apples", 0, Decimal::new(25, 0))];
        assert!(matches!(
            validate_items(&items),
            Err(CheckoutError::InvalidQuantity { qty: 0, .. })
        ));
    }

    #[test]
    fn test_valid_items_accepted() {
        let items = vec![item("Apples", 1, Decimal::new(25, 0))];
        assert!(validate_items(&items).is_ok());
    }

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();
        assert!(number.starts_with("ORD-"));
        assert_eq!(number.len(), 4 + ORDER_NUMBER_LENGTH);
        assert!(
            number
                .trim_start_matches("ORD-")
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        );
    }
}

//! Coupon domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use farmlink_core::{CouponCode, CouponId, UserId};

/// A discount coupon with a validity window.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Coupon {
    /// Unique coupon ID.
    pub id: CouponId,
    /// Coupon code (unique, upper-cased).
    pub code: CouponCode,
    /// Discount percentage, 0-100.
    pub discount: Decimal,
    /// Start of the validity window.
    pub start_date: DateTime<Utc>,
    /// End of the validity window.
    pub end_date: DateTime<Utc>,
    /// Admin who created the coupon.
    pub user_id: UserId,
    /// When the coupon was created.
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// Whether the coupon's window has passed.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date
    }

    /// Whether the coupon can be redeemed right now.
    ///
    /// Valid for use iff `now` lies within `[start_date, end_date]`.
    #[must_use]
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }

    /// Discount as a fraction in `[0, 1]` (e.g. 10% → 0.1).
    #[must_use]
    pub fn discount_fraction(&self) -> Decimal {
        self.discount / Decimal::ONE_HUNDRED
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(start: DateTime<Utc>, end: DateTime<Utc>) -> Coupon {
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
    fn test_redeemable_within_window() {
        let now = Utc::now();
        let c = coupon(now - Duration::days(1), now + Duration::days(1));
        assert!(c.is_redeemable(now));
        assert!(!c.is_expired(now));
    }

    #[test]
    fn test_not_redeemable_after_end() {
        let now = Utc::now();
        let c = coupon(now - Duration::days(10), now - Duration::days(1));
        assert!(!c.is_redeemable(now));
        assert!(c.is_expired(now));
    }

    #[test]
    fn test_not_redeemable_before_start() {
        let now = Utc::now();
        let c = coupon(now + Duration::days(1), now + Duration::days(10));
        assert!(!c.is_redeemable(now));
        assert!(!c.is_expired(now));
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let now = Utc::now();
        let c = coupon(now, now);
        assert!(c.is_redeemable(now));
    }

    #[test]
    fn test_discount_fraction() {
        let now = Utc::now();
        let c = coupon(now, now + Duration::days(1));
        assert_eq!(c.discount_fraction(), Decimal::new(1, 1)); // 0.1
    }
}

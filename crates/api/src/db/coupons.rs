//! Coupon repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use farmlink_core::{CouponCode, CouponId, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::coupon::Coupon;

/// Repository for coupon database operations.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code is taken.
    pub async fn create(
        &self,
        code: &CouponCode,
        discount: Decimal,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        user_id: UserId,
    ) -> Result<Coupon, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(
            "INSERT INTO coupons (code, discount, start_date, end_date, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(code)
        .bind(discount)
        .bind(start_date)
        .bind(end_date)
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, |_| "coupon already exists".to_owned()))?;

        Ok(coupon)
    }

    /// Get a coupon by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CouponId) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(coupon)
    }

    /// Get a coupon by its (normalized) code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE code = $1")
            .bind(code)
            .fetch_optional(self.pool)
            .await?;

        Ok(coupon)
    }

    /// List all coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let coupons = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons ORDER BY created_at DESC")
            .fetch_all(self.pool)
            .await?;

        Ok(coupons)
    }

    /// Update coupon fields; `None` keeps the current value.
    ///
    /// Returns `None` if the coupon does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a new code is taken.
    pub async fn update(
        &self,
        id: CouponId,
        code: Option<&CouponCode>,
        discount: Option<Decimal>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(
            "UPDATE coupons
             SET code = COALESCE($2, code),
                 discount = COALESCE($3, discount),
                 start_date = COALESCE($4, start_date),
                 end_date = COALESCE($5, end_date)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(code)
        .bind(discount)
        .bind(start_date)
        .bind(end_date)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, |_| "coupon already exists".to_owned()))?;

        Ok(coupon)
    }

    /// Delete a coupon, returning it. Returns `None` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CouponId) -> Result<Option<Coupon>, RepositoryError> {
        let coupon =
            sqlx::query_as::<_, Coupon>("DELETE FROM coupons WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(coupon)
    }
}

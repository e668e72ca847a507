//! Coupon route handlers.
//!
//! Authoring is plain admin CRUD; validity is only evaluated at redemption
//! inside the checkout flow. Responses include the derived `is_expired`
//! flag for admin dashboards.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use farmlink_core::{CouponCode, CouponId};

use crate::db::CouponRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::coupon::Coupon;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    /// Discount percentage, 0-100. Non-numeric input is rejected by the
    /// deserializer before this handler runs.
    pub discount: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCouponRequest {
    pub code: Option<String>,
    pub discount: Option<Decimal>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

fn validate_discount(discount: Decimal) -> Result<()> {
    if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        return Err(AppError::Validation(
            "discount must be between 0 and 100".to_owned(),
        ));
    }
    Ok(())
}

fn parse_code(raw: &str) -> Result<CouponCode> {
    CouponCode::parse(raw).map_err(|e| AppError::Validation(e.to_string()))
}

fn coupon_json(coupon: &Coupon) -> Value {
    let mut value = serde_json::to_value(coupon).unwrap_or_else(|_| json!({}));
    value["is_expired"] = json!(coupon.is_expired(Utc::now()));
    value
}

/// POST /api/v1/coupons (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Json(req): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let code = parse_code(&req.code)?;
    validate_discount(req.discount)?;

    let coupon = CouponRepository::new(state.pool())
        .create(&code, req.discount, req.start_date, req.end_date, auth.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Coupon created successfully",
            "coupon": coupon_json(&coupon),
        })),
    ))
}

/// GET /api/v1/coupons (admin)
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Value>> {
    let coupons = CouponRepository::new(state.pool()).list_all().await?;
    let coupons: Vec<Value> = coupons.iter().map(coupon_json).collect();

    Ok(Json(json!({
        "status": "success",
        "message": "All coupons",
        "coupons": coupons,
    })))
}

/// GET /api/v1/coupons/{id} (admin)
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<CouponId>,
) -> Result<Json<Value>> {
    let coupon = CouponRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("coupon not found".to_owned()))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Coupon fetched",
        "coupon": coupon_json(&coupon),
    })))
}

/// PUT /api/v1/coupons/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<CouponId>,
    Json(req): Json<UpdateCouponRequest>,
) -> Result<Json<Value>> {
    let code = req.code.as_deref().map(parse_code).transpose()?;
    if let Some(discount) = req.discount {
        validate_discount(discount)?;
    }

    let coupon = CouponRepository::new(state.pool())
        .update(
            id,
            code.as_ref(),
            req.discount,
            req.start_date,
            req.end_date,
        )
        .await?
        .ok_or_else(|| AppError::NotFound("coupon not found".to_owned()))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Coupon updated successfully",
        "coupon": coupon_json(&coupon),
    })))
}

/// DELETE /api/v1/coupons/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<CouponId>,
) -> Result<Json<Value>> {
    let coupon = CouponRepository::new(state.pool())
        .delete(id)
        .await?
        .ok_or_else(|| AppError::NotFound("coupon not found".to_owned()))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Coupon deleted successfully",
        "coupon": coupon_json(&coupon),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_discount_bounds() {
        assert!(validate_discount(Decimal::ZERO).is_ok());
        assert!(validate_discount(Decimal::new(50, 0)).is_ok());
        assert!(validate_discount(Decimal::ONE_HUNDRED).is_ok());
        assert!(validate_discount(Decimal::new(101, 0)).is_err());
        assert!(validate_discount(Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn test_parse_code_normalizes() {
        let code = parse_code("save10").expect("valid code");
        assert_eq!(code.as_str(), "SAVE10");
    }

    #[test]
    fn test_parse_code_rejects_empty() {
        assert!(parse_code("").is_err());
    }
}

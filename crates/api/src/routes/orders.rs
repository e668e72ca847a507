//! Order route handlers: checkout, fulfillment, statistics.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use farmlink_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::user::ShippingAddress;
use crate::services::checkout::{CheckoutService, OrderItemRequest};
use crate::services::fulfillment::FulfillmentService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    /// Optional coupon code, case-insensitive.
    pub coupon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderItemRequest>,
    /// Optional snapshot override; the address on file is used otherwise.
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// POST /api/v1/orders?coupon=CODE
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Query(query): Query<CheckoutQuery>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let checkout = CheckoutService::new(state.pool(), state.stripe());
    let outcome = checkout
        .place_order(
            auth.id,
            req.items,
            req.shipping_address,
            query.coupon.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Order created successfully",
            "order": outcome.order,
            "url": outcome.payment_url,
        })),
    ))
}

/// GET /api/v1/orders (admin)
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Value>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Orders fetched successfully",
        "orders": orders,
    })))
}

/// GET /api/v1/orders/{id} (owner or admin)
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Value>> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_owned()))?;

    if !auth.can_modify(order.user_id) {
        return Err(AppError::Forbidden(
            "you do not have permission to view this order".to_owned(),
        ));
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Order fetched successfully",
        "order": order,
    })))
}

/// PUT /api/v1/orders/update/{id} (admin)
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Value>> {
    let fulfillment = FulfillmentService::new(state.pool(), state.email());
    let order = fulfillment.update_status(id, &req.status).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Order updated successfully",
        "order": order,
    })))
}

/// GET /api/v1/orders/sales/stats (admin)
pub async fn sales_stats(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Value>> {
    let orders = OrderRepository::new(state.pool());
    let stats = orders.sales_stats().await?;

    let today_start = Utc::now()
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc();
    let sales_today = orders.sales_since(today_start).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Sales statistics fetched successfully",
        "stats": stats,
        "sales_today": sales_today,
    })))
}

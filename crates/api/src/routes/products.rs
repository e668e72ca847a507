//! Product route handlers: catalog CRUD and search.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use farmlink_core::ProductId;

use crate::db::products::ProductFilter;
use crate::db::{CategoryRepository, NotificationRepository, ProductRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    /// Category name, matched case-insensitively.
    pub category: String,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    /// Externally hosted image URLs; at least one is required.
    #[serde(default)]
    pub images: Vec<String>,
    pub price: Decimal,
    pub total_qty: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub price: Option<Decimal>,
    pub total_qty: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub name: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    /// Inclusive price range as `min-max`, e.g. `5-20`.
    pub price: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Parse a `min-max` price range.
fn parse_price_range(raw: &str) -> Result<(Decimal, Decimal)> {
    let invalid =
        || AppError::Validation(format!("invalid price range '{raw}', expected 'min-max'"));

    let (min, max) = raw.split_once('-').ok_or_else(invalid)?;
    let min: Decimal = min.trim().parse().map_err(|_| invalid())?;
    let max: Decimal = max.trim().parse().map_err(|_| invalid())?;
    Ok((min, max))
}

impl ProductQuery {
    fn filter(&self) -> Result<ProductFilter> {
        let (price_min, price_max) = match self.price.as_deref() {
            Some(raw) => {
                let (min, max) = parse_price_range(raw)?;
                (Some(min), Some(max))
            }
            None => (None, None),
        };

        Ok(ProductFilter {
            name: self.name.clone(),
            category: self.category.clone(),
            color: self.color.clone(),
            size: self.size.clone(),
            price_min,
            price_max,
        })
    }
}

/// POST /api/v1/products
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    if req.images.is_empty() {
        return Err(AppError::Validation(
            "please provide at least one product image".to_owned(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .get_by_id(auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    if !user.is_email_verified {
        return Err(AppError::Forbidden(
            "please verify your email before listing products".to_owned(),
        ));
    }

    let category = CategoryRepository::new(state.pool())
        .get_by_name(&req.category)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".to_owned()))?;

    let product = ProductRepository::new(state.pool())
        .create(
            &req.name,
            &req.description,
            category.id,
            &req.sizes,
            &req.colors,
            &req.images,
            req.price,
            req.total_qty,
            user.id,
        )
        .await?;

    let message = format!(
        "A new product {} has been added to the store by {}.",
        product.name, user.fullname
    );
    NotificationRepository::new(state.pool())
        .create(user.id, &message)
        .await?;

    // Fire-and-forget confirmation email to the creator
    let email = state.email().clone();
    let to = user.email.clone();
    let product_name = product.name.clone();
    tokio::spawn(async move {
        if let Err(e) = email.send_product_created(to.as_str(), &product_name).await {
            tracing::warn!(error = %e, "product created email failed");
        }
    });

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Product created successfully",
            "product": product,
        })),
    ))
}

/// GET /api/v1/products
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Value>> {
    let filter = query.filter()?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;

    let products = ProductRepository::new(state.pool());
    let total = products.count(&filter).await?;
    let results = products.search(&filter, limit, offset).await?;

    let mut pagination = json!({});
    if offset + limit < total {
        pagination["next"] = json!({ "page": page + 1, "limit": limit });
    }
    if offset > 0 {
        pagination["prev"] = json!({ "page": page - 1, "limit": limit });
    }

    Ok(Json(json!({
        "status": "success",
        "total": total,
        "results": results.len(),
        "pagination": pagination,
        "message": "Products fetched successfully",
        "products": results,
    })))
}

/// GET /api/v1/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Product fetched successfully",
        "product": product,
    })))
}

/// PUT /api/v1/products/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<ProductId>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Value>> {
    let products = ProductRepository::new(state.pool());
    let product = products
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    if !auth.can_modify(product.user_id) {
        return Err(AppError::Forbidden(
            "you do not have permission to update this product".to_owned(),
        ));
    }

    let category_id = match req.category.as_deref() {
        Some(name) => Some(
            CategoryRepository::new(state.pool())
                .get_by_name(name)
                .await?
                .ok_or_else(|| AppError::NotFound("category not found".to_owned()))?
                .id,
        ),
        None => None,
    };

    let updated = products
        .update(
            id,
            req.name.as_deref(),
            req.description.as_deref(),
            category_id,
            req.sizes.as_deref(),
            req.colors.as_deref(),
            req.images.as_deref(),
            req.price,
            req.total_qty,
        )
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Product updated successfully",
        "product": updated,
    })))
}

/// DELETE /api/v1/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    let products = ProductRepository::new(state.pool());
    let product = products
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    if !auth.can_modify(product.user_id) {
        return Err(AppError::Forbidden(
            "you do not have permission to delete this product".to_owned(),
        ));
    }

    products.delete(id).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Product deleted successfully",
    })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_range_valid() {
        let (min, max) = parse_price_range("5-20").unwrap();
        assert_eq!(min, Decimal::new(5, 0));
        assert_eq!(max, Decimal::new(20, 0));
    }

    #[test]
    fn test_parse_price_range_decimal_bounds() {
        let (min, max) = parse_price_range("0.50-19.99").unwrap();
        assert_eq!(min, Decimal::new(50, 2));
        assert_eq!(max, Decimal::new(1999, 2));
    }

    #[test]
    fn test_parse_price_range_invalid() {
        assert!(parse_price_range("cheap").is_err());
        assert!(parse_price_range("5-abc").is_err());
    }
}

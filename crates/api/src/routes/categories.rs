//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use farmlink_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

/// POST /api/v1/categories (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("category name is required".to_owned()));
    }

    let category = CategoryRepository::new(state.pool())
        .create(req.name.trim(), req.image_url.as_deref(), auth.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Category created successfully",
            "category": category,
        })),
    ))
}

/// GET /api/v1/categories
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>> {
    let categories = CategoryRepository::new(state.pool()).list_all().await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Categories fetched successfully",
        "categories": categories,
    })))
}

/// GET /api/v1/categories/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Value>> {
    let category = CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".to_owned()))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Category fetched successfully",
        "category": category,
    })))
}

/// PUT /api/v1/categories/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<CategoryId>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<Value>> {
    let category = CategoryRepository::new(state.pool())
        .update(id, req.name.as_deref(), req.image_url.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".to_owned()))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Category updated successfully",
        "category": category,
    })))
}

/// DELETE /api/v1/categories/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<Value>> {
    let deleted = CategoryRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("category not found".to_owned()));
    }

    Ok(Json(json!({
        "status": "success",
        "message": "Category deleted successfully",
    })))
}

//! User route handlers: accounts, sessions, tokens, shipping addresses.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use farmlink_core::{Email, UserId, UserRole};

use crate::db::{NotificationRepository, OrderRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::services::auth::{AuthService, hash_password, issue_access_token};
use crate::state::AppState;
use crate::models::user::ShippingAddress;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub fullname: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// POST /api/v1/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(
            &req.fullname,
            &req.email,
            req.phone.as_deref(),
            &req.password,
            req.role.unwrap_or_default(),
        )
        .await?;

    let notifications = NotificationRepository::new(state.pool());
    notifications
        .create(
            user.id,
            "Welcome to FarmLink - your trusted platform for buying and selling fresh farm produce!",
        )
        .await?;

    // Fire-and-forget welcome email
    let email = state.email().clone();
    let to = user.email.clone();
    let name = user.fullname.clone();
    tokio::spawn(async move {
        if let Err(e) = email.send_welcome(to.as_str(), &name).await {
            tracing::warn!(error = %e, "welcome email failed");
        }
    });

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "User registered successfully",
            "user": user,
        })),
    ))
}

/// POST /api/v1/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&req.email, &req.password).await?;
    let token = issue_access_token(&user, &state.config().jwt_secret)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Login successful",
        "user": user,
        "token": token,
    })))
}

/// GET /api/v1/users/profile
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<Value>> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    let orders = OrderRepository::new(state.pool())
        .list_for_user(auth.id)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "User profile fetched successfully",
        "user": user,
        "orders": orders,
    })))
}

/// PUT /api/v1/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Value>> {
    let email = req
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let password_hash = req
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;

    let users = UserRepository::new(state.pool());
    let user = users
        .update_profile(
            auth.id,
            req.fullname.as_deref(),
            email.as_ref(),
            req.phone.as_deref(),
            password_hash.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    NotificationRepository::new(state.pool())
        .create(user.id, "Your profile has been updated successfully.")
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "User profile updated successfully",
        "user": user,
    })))
}

/// PUT /api/v1/users/shipping
pub async fn update_shipping_address(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Json(address): Json<ShippingAddress>,
) -> Result<Json<Value>> {
    let users = UserRepository::new(state.pool());
    let user = users
        .set_shipping_address(auth.id, &address)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    Ok(Json(json!({
        "status": "success",
        "message": "User shipping address updated successfully",
        "user": user,
    })))
}

/// GET /api/v1/users (admin)
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Value>> {
    let users = UserRepository::new(state.pool()).list_all().await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Users fetched successfully",
        "users": users,
    })))
}

/// DELETE /api/v1/users/profile
pub async fn delete_account(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<Value>> {
    let deleted = UserRepository::new(state.pool()).delete(auth.id).await?;
    if !deleted {
        return Err(AppError::NotFound("user not found".to_owned()));
    }

    Ok(Json(json!({
        "status": "success",
        "message": "User deleted successfully",
    })))
}

/// PUT /api/v1/users/block/{id} (admin)
pub async fn block(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<Value>> {
    set_blocked(&state, id, true, "User blocked successfully").await
}

/// PUT /api/v1/users/unblock/{id} (admin)
pub async fn unblock(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<Value>> {
    set_blocked(&state, id, false, "User unblocked successfully").await
}

async fn set_blocked(
    state: &AppState,
    id: UserId,
    blocked: bool,
    message: &str,
) -> Result<Json<Value>> {
    let user = UserRepository::new(state.pool())
        .set_blocked(id, blocked)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    Ok(Json(json!({
        "status": "success",
        "message": message,
        "username": user.fullname,
        "is_blocked": user.is_blocked,
    })))
}

/// POST /api/v1/users/verify-email
///
/// Issues a verification token and emails it to the account address.
pub async fn request_email_verification(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<Value>> {
    let service = AuthService::new(state.pool());
    let token = service.request_email_verification(auth.id).await?;

    let user = UserRepository::new(state.pool())
        .get_by_id(auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    let email = state.email().clone();
    let to = user.email.clone();
    tokio::spawn(async move {
        if let Err(e) = email.send_verification_token(to.as_str(), &token).await {
            tracing::warn!(error = %e, "verification email failed");
        }
    });

    Ok(Json(json!({
        "status": "success",
        "message": "Email verification token sent to your email and expires in 10 minutes",
    })))
}

/// POST /api/v1/users/verify-email/{token}
pub async fn confirm_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Value>> {
    let service = AuthService::new(state.pool());
    service.confirm_email(&token).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Account verified successfully",
    })))
}

/// POST /api/v1/users/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>> {
    let service = AuthService::new(state.pool());
    let (user, token) = service.request_password_reset(&req.email).await?;

    let email = state.email().clone();
    let to = user.email.clone();
    tokio::spawn(async move {
        if let Err(e) = email.send_password_reset(to.as_str(), &token).await {
            tracing::warn!(error = %e, "password reset email failed");
        }
    });

    Ok(Json(json!({
        "status": "success",
        "message": "Password reset token sent to your email and expires in 10 minutes",
    })))
}

/// POST /api/v1/users/reset-password/{token}
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<Value>> {
    let service = AuthService::new(state.pool());
    service.reset_password(&token, &req.password).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Password reset successfully",
    })))
}

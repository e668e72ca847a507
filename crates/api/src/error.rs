//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; the response body is always JSON of the shape
//! `{"status": "error", "message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::fulfillment::FulfillmentError;
use crate::services::stripe::StripeError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout flow failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Fulfillment flow failed.
    #[error("Fulfillment error: {0}")]
    Fulfillment(#[from] FulfillmentError),

    /// Payment provider operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] StripeError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate unique field.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed or missing input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller does not own the resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Auth(err) => auth_status(err),
            Self::Checkout(err) => checkout_status(err),
            Self::Fulfillment(err) => fulfillment_status(err),
            Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal details are never exposed.
    fn client_message(&self) -> String {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "Not found".to_owned(),
                RepositoryError::Conflict(msg) => msg.clone(),
                _ => "Internal server error".to_owned(),
            },
            Self::Auth(err) => match err {
                AuthError::Repository(RepositoryError::Conflict(msg)) => msg.clone(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_owned()
                }
                other => other.to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::Repository(RepositoryError::Conflict(msg)) => msg.clone(),
                CheckoutError::Repository(_) => "Internal server error".to_owned(),
                CheckoutError::Payment(_) => "Payment provider error".to_owned(),
                other => other.to_string(),
            },
            Self::Fulfillment(err) => match err {
                FulfillmentError::Repository(_) => "Internal server error".to_owned(),
                other => other.to_string(),
            },
            Self::Payment(_) => "Payment provider error".to_owned(),
            Self::Internal(_) => "Internal server error".to_owned(),
            other => other.to_string(),
        }
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials | AuthError::TokenExpired | AuthError::TokenInvalid => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::AccountBlocked => StatusCode::FORBIDDEN,
        AuthError::UserAlreadyExists(_) => StatusCode::CONFLICT,
        AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
        AuthError::UserNotFound => StatusCode::NOT_FOUND,
        AuthError::Repository(err) => repository_status(err),
        AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn checkout_status(err: &CheckoutError) -> StatusCode {
    match err {
        CheckoutError::CouponNotFound(_) | CheckoutError::BuyerNotFound => StatusCode::NOT_FOUND,
        CheckoutError::CouponExpired(_)
        | CheckoutError::MissingShippingAddress
        | CheckoutError::EmptyOrder
        | CheckoutError::InvalidQuantity { .. }
        | CheckoutError::InvalidPrice(_) => StatusCode::BAD_REQUEST,
        CheckoutError::Repository(err) => repository_status(err),
        CheckoutError::Payment(_) => StatusCode::BAD_GATEWAY,
    }
}

fn fulfillment_status(err: &FulfillmentError) -> StatusCode {
    match err {
        FulfillmentError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        FulfillmentError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
        FulfillmentError::Repository(err) => repository_status(err),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Capture server-side errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = serde_json::json!({
            "status": "error",
            "message": self.client_message(),
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use farmlink_core::OrderId;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_basic_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("coupon".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Conflict("email already exists".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Validation("bad input".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Forbidden("not yours".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Unauthorized("no token".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_checkout_status_codes() {
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::CouponNotFound(
                "SAVE10".to_string()
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::CouponExpired(
                "SAVE10".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::EmptyOrder)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::MissingShippingAddress)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_fulfillment_status_codes() {
        assert_eq!(
            get_status(AppError::Fulfillment(FulfillmentError::OrderNotFound(
                OrderId::new(9)
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Fulfillment(FulfillmentError::InvalidStatus(
                "teleported".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::TokenExpired)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists(
                "email already exists".to_string()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::AccountBlocked)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AppError::Internal("connection pool exhausted at 10.0.0.3".to_string());
        assert_eq!(err.client_message(), "Internal server error");
    }
}

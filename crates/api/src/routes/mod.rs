//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (DB ping)
//!
//! # Users
//! POST /api/v1/users/register           - Register
//! POST /api/v1/users/login              - Login, returns bearer token
//! GET  /api/v1/users/profile            - Own profile with order history
//! PUT  /api/v1/users/profile            - Update profile
//! DELETE /api/v1/users/profile          - Delete own account
//! PUT  /api/v1/users/shipping           - Update shipping address
//! GET  /api/v1/users                    - List users (admin)
//! PUT  /api/v1/users/block/{id}         - Block user (admin)
//! PUT  /api/v1/users/unblock/{id}       - Unblock user (admin)
//! POST /api/v1/users/verify-email       - Request verification token
//! POST /api/v1/users/verify-email/{token} - Confirm email
//! POST /api/v1/users/forgot-password    - Request password-reset token
//! POST /api/v1/users/reset-password/{token} - Reset password
//!
//! # Products
//! POST /api/v1/products                 - Create product
//! GET  /api/v1/products                 - Search catalog (filters + pagination)
//! GET  /api/v1/products/{id}            - Product detail
//! PUT  /api/v1/products/{id}            - Update product (owner or admin)
//! DELETE /api/v1/products/{id}          - Delete product (owner or admin)
//!
//! # Categories
//! POST /api/v1/categories               - Create category (admin)
//! GET  /api/v1/categories               - List categories
//! GET  /api/v1/categories/{id}          - Category detail
//! PUT  /api/v1/categories/{id}          - Update category (admin)
//! DELETE /api/v1/categories/{id}        - Delete category (admin)
//!
//! # Coupons
//! POST /api/v1/coupons                  - Create coupon (admin)
//! GET  /api/v1/coupons                  - List coupons (admin)
//! GET  /api/v1/coupons/{id}             - Coupon detail (admin)
//! PUT  /api/v1/coupons/{id}             - Update coupon (admin)
//! DELETE /api/v1/coupons/{id}           - Delete coupon (admin)
//!
//! # Orders
//! POST /api/v1/orders?coupon=CODE       - Checkout, returns payment URL
//! GET  /api/v1/orders                   - List all orders (admin)
//! GET  /api/v1/orders/{id}              - Order detail (owner or admin)
//! PUT  /api/v1/orders/update/{id}       - Update status (admin)
//! GET  /api/v1/orders/sales/stats       - Sales statistics (admin)
//!
//! # Notifications
//! GET  /api/v1/notifications            - Own notifications
//! PUT  /api/v1/notifications/{id}/read  - Mark one read
//! ```

pub mod categories;
pub mod coupons;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route(
            "/profile",
            get(users::profile)
                .put(users::update_profile)
                .delete(users::delete_account),
        )
        .route("/shipping", put(users::update_shipping_address))
        .route("/", get(users::list))
        .route("/block/{id}", put(users::block))
        .route("/unblock/{id}", put(users::unblock))
        .route("/verify-email", post(users::request_email_verification))
        .route("/verify-email/{token}", post(users::confirm_email))
        .route("/forgot-password", post(users::forgot_password))
        .route("/reset-password/{token}", post(users::reset_password))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create).get(products::search))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(categories::create).get(categories::list))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
}

/// Create the coupon routes router.
pub fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(coupons::create).get(coupons::list))
        .route(
            "/{id}",
            get(coupons::show)
                .put(coupons::update)
                .delete(coupons::delete),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list))
        .route("/{id}", get(orders::show))
        .route("/update/{id}", put(orders::update_status))
        .route("/sales/stats", get(orders::sales_stats))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list))
        .route("/{id}/read", put(notifications::mark_read))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/v1/users", user_routes())
        .nest("/api/v1/products", product_routes())
        .nest("/api/v1/categories", category_routes())
        .nest("/api/v1/coupons", coupon_routes())
        .nest("/api/v1/orders", order_routes())
        .nest("/api/v1/notifications", notification_routes())
}

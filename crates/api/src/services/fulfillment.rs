//! Order fulfillment: status updates with notification fan-out.
//!
//! Persisting the new status is the operation; the email and in-app
//! notification are side effects. The email is fire-and-forget — a delivery
//! failure is logged and never rolls back the status change.

use sqlx::PgPool;
use thiserror::Error;

use farmlink_core::{OrderId, OrderStatus};

use crate::db::{NotificationRepository, OrderRepository, RepositoryError, UserRepository};
use crate::models::order::Order;
use crate::services::email::EmailService;

/// Errors that can occur while updating fulfillment status.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// The order does not exist.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The requested status is not a known status value.
    #[error("invalid order status: {0}")]
    InvalidStatus(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Fulfillment updater.
pub struct FulfillmentService<'a> {
    orders: OrderRepository<'a>,
    users: UserRepository<'a>,
    notifications: NotificationRepository<'a>,
    email: &'a EmailService,
}

impl<'a> FulfillmentService<'a> {
    /// Create a new fulfillment service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: &'a EmailService) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            users: UserRepository::new(pool),
            notifications: NotificationRepository::new(pool),
            email,
        }
    }

    /// Persist a new status for an order and notify its owner.
    ///
    /// Repeating the same update is idempotent in persisted state; the
    /// notification side effects are best-effort, not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns `FulfillmentError::InvalidStatus` for an unknown status
    /// string and `FulfillmentError::OrderNotFound` if the order is absent.
    pub async fn update_status(
        &self,
        id: OrderId,
        new_status: &str,
    ) -> Result<Order, FulfillmentError> {
        let status: OrderStatus = new_status
            .parse()
            .map_err(|_| FulfillmentError::InvalidStatus(new_status.to_owned()))?;

        let order = self
            .orders
            .set_status(id, status)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(id))?;

        if let Some(user) = self.users.get_by_id(order.user_id).await? {
            let message = format!(
                "Your order #{} status has been updated to {status}.",
                order.order_number
            );
            self.notifications.create(user.id, &message).await?;

            let email = self.email.clone();
            let to = user.email.clone();
            let order_number = order.order_number.clone();
            tokio::spawn(async move {
                if let Err(e) = email
                    .send_order_status(to.as_str(), &order_number, status)
                    .await
                {
                    tracing::warn!(error = %e, %order_number, "order status email failed");
                }
            });
        }

        tracing::info!(order_id = %order.id, status = %status, "order status updated");

        Ok(order)
    }
}

//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmlink_core::{Email, UserId, UserRole};

/// A FarmLink account.
///
/// The password hash and one-time token digests live only in the database
/// and the repository layer; they are never part of the domain type, so a
/// `User` can be serialized into an API response as-is.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub fullname: String,
    /// Email address (unique).
    pub email: Email,
    /// Phone number (unique when present).
    pub phone: Option<String>,
    /// Account role.
    pub role: UserRole,
    /// Blocked accounts cannot log in.
    pub is_blocked: bool,
    /// Whether the email has been verified.
    pub is_email_verified: bool,
    /// Shipping address on file, copied into orders at checkout.
    pub shipping_address: Option<ShippingAddress>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user has a shipping address on file.
    #[must_use]
    pub const fn has_shipping_address(&self) -> bool {
        self.shipping_address.is_some()
    }
}

/// A shipping address, stored on the user and snapshotted into orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub province: String,
    pub country: String,
    pub phone: String,
}

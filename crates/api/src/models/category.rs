//! Category domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use farmlink_core::{CategoryId, UserId};

/// A product category. Names are stored lower-cased.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Category name (unique, lower-cased).
    pub name: String,
    /// Externally hosted image URL.
    pub image_url: Option<String>,
    /// User who created the category.
    pub user_id: UserId,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

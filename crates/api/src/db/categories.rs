//! Category repository for database operations.

use sqlx::PgPool;

use farmlink_core::{CategoryId, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::category::Category;

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new category. The name is stored lower-cased.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(
        &self,
        name: &str,
        image_url: Option<&str>,
        user_id: UserId,
    ) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, image_url, user_id)
             VALUES (lower($1), $2, $3)
             RETURNING *",
        )
        .bind(name)
        .bind(image_url)
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, |_| "category already exists".to_owned()))?;

        Ok(category)
    }

    /// Get a category by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(category)
    }

    /// Get a category by its (case-insensitive) name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let category =
            sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = lower($1)")
                .bind(name)
                .fetch_optional(self.pool)
                .await?;

        Ok(category)
    }

    /// List all categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
            .fetch_all(self.pool)
            .await?;

        Ok(categories)
    }

    /// Rename a category or replace its image; `None` keeps the current
    /// value. Returns `None` if the category does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        name: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories
             SET name = COALESCE(lower($2), name),
                 image_url = COALESCE($3, image_url)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(image_url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, |_| "category already exists".to_owned()))?;

        Ok(category)
    }

    /// Delete a category. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

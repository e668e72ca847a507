//! Product repository for database operations.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use farmlink_core::{CategoryId, ProductId, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::product::Product;

/// Catalog search filters. All fields are optional and combined with AND.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Case-insensitive category name match.
    pub category: Option<String>,
    /// Case-insensitive color match against the colors array.
    pub color: Option<String>,
    /// Case-insensitive size match against the sizes array.
    pub size: Option<String>,
    /// Inclusive price range.
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
}

/// Append the filter's WHERE conditions to a query.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    if let Some(name) = &filter.name {
        qb.push(" AND p.name ILIKE ").push_bind(format!("%{name}%"));
    }
    if let Some(category) = &filter.category {
        qb.push(" AND p.category_id IN (SELECT id FROM categories WHERE name ILIKE ")
            .push_bind(format!("%{category}%"))
            .push(")");
    }
    if let Some(color) = &filter.color {
        qb.push(" AND EXISTS (SELECT 1 FROM unnest(p.colors) AS c WHERE c ILIKE ")
            .push_bind(format!("%{color}%"))
            .push(")");
    }
    if let Some(size) = &filter.size {
        qb.push(" AND EXISTS (SELECT 1 FROM unnest(p.sizes) AS s WHERE s ILIKE ")
            .push_bind(format!("%{size}%"))
            .push(")");
    }
    if let Some(min) = filter.price_min {
        qb.push(" AND p.price >= ").push_bind(min);
    }
    if let Some(max) = filter.price_max {
        qb.push(" AND p.price <= ").push_bind(max);
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        name: &str,
        description: &str,
        category_id: CategoryId,
        sizes: &[String],
        colors: &[String],
        images: &[String],
        price: Decimal,
        total_qty: i32,
        user_id: UserId,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products
                 (name, description, category_id, sizes, colors, images, price, total_qty, user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(name)
        .bind(description)
        .bind(category_id)
        .bind(sizes)
        .bind(colors)
        .bind(images)
        .bind(price)
        .bind(total_qty)
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, |_| "product already exists".to_owned()))?;

        Ok(product)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(product)
    }

    /// Search the catalog with pagination, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut qb = QueryBuilder::new("SELECT p.* FROM products p WHERE TRUE");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY p.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let products = qb
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// Count products matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &ProductFilter) -> Result<i64, RepositoryError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM products p WHERE TRUE");
        push_filters(&mut qb, filter);

        let count: i64 = qb.build_query_scalar().fetch_one(self.pool).await?;

        Ok(count)
    }

    /// Update product fields; `None` keeps the current value.
    ///
    /// Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a new name is taken.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: ProductId,
        name: Option<&str>,
        description: Option<&str>,
        category_id: Option<CategoryId>,
        sizes: Option<&[String]>,
        colors: Option<&[String]>,
        images: Option<&[String]>,
        price: Option<Decimal>,
        total_qty: Option<i32>,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "UPDATE products
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 category_id = COALESCE($4, category_id),
                 sizes = COALESCE($5, sizes),
                 colors = COALESCE($6, colors),
                 images = COALESCE($7, images),
                 price = COALESCE($8, price),
                 total_qty = COALESCE($9, total_qty),
                 updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(category_id)
        .bind(sizes)
        .bind(colors)
        .bind(images)
        .bind(price)
        .bind(total_qty)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, |_| "product already exists".to_owned()))?;

        Ok(product)
    }

    /// Delete a product. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add `qty` to a product's `total_sold` counter.
    ///
    /// A single atomic UPDATE: concurrent checkouts against the same product
    /// cannot lose increments. Returns the number of rows touched, so a
    /// stale product reference (0 rows) can be skipped by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn increment_total_sold(
        &self,
        id: ProductId,
        qty: i32,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET total_sold = total_sold + $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(qty)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

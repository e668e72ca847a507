//! Order repository for database operations.
//!
//! An order and its line items are written in one transaction so the
//! aggregate appears atomically, mirroring a single document write. No
//! other operation in the system spans multiple aggregates.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::types::Json;

use farmlink_core::{OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem};
use crate::models::user::ShippingAddress;

/// Input for one order line at creation time.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Option<ProductId>,
    pub name: String,
    pub description: Option<String>,
    pub qty: i32,
    pub unit_price: Decimal,
}

/// Aggregates over all orders' totals.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesStats {
    pub minimum_sale: Option<Decimal>,
    pub maximum_sale: Option<Decimal>,
    pub total_sales: Option<Decimal>,
    pub average_sale: Option<Decimal>,
}

/// Database row backing an [`Order`] (items fetched separately).
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    user_id: UserId,
    shipping_address: Json<ShippingAddress>,
    total_price: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            user_id: self.user_id,
            items,
            shipping_address: self.shipping_address.0,
            total_price: self.total_price,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; the
    /// transaction is rolled back and nothing is written.
    pub async fn create(
        &self,
        user_id: UserId,
        order_number: &str,
        shipping_address: &ShippingAddress,
        total_price: Decimal,
        items: &[NewOrderItem],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (order_number, user_id, shipping_address, total_price)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(order_number)
        .bind(user_id)
        .bind(Json(shipping_address))
        .bind(total_price)
        .fetch_one(&mut *tx)
        .await?;

        let mut persisted = Vec::with_capacity(items.len());
        for item in items {
            let persisted_item = sqlx::query_as::<_, OrderItem>(
                "INSERT INTO order_items (order_id, product_id, name, description, qty, unit_price)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING id, product_id, name, description, qty, unit_price",
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(item.description.as_deref())
            .bind(item.qty)
            .bind(item.unit_price)
            .fetch_one(&mut *tx)
            .await?;
            persisted.push(persisted_item);
        }

        tx.commit().await?;

        Ok(row.into_order(persisted))
    }

    /// Get an order with its items by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.items_for(row.id).await?;
        Ok(Some(row.into_order(items)))
    }

    /// List all orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders ORDER BY created_at DESC")
            .fetch_all(self.pool)
            .await?;

        self.attach_items(rows).await
    }

    /// List a user's orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        #[derive(sqlx::FromRow)]
        struct ItemRow {
            order_id: i32,
            #[sqlx(flatten)]
            item: OrderItem,
        }

        let item_rows = sqlx::query_as::<_, ItemRow>(
            "SELECT order_id, id, product_id, name, description, qty, unit_price
             FROM order_items WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for r in item_rows {
            by_order.entry(r.order_id).or_default().push(r.item);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }

    /// Persist a new status, returning the updated order with items.
    ///
    /// Returns `None` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.items_for(row.id).await?;
        Ok(Some(row.into_order(items)))
    }

    /// Min/max/sum/average over all orders' totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales_stats(&self) -> Result<SalesStats, RepositoryError> {
        let stats = sqlx::query_as::<_, SalesStats>(
            "SELECT MIN(total_price) AS minimum_sale,
                    MAX(total_price) AS maximum_sale,
                    SUM(total_price) AS total_sales,
                    AVG(total_price) AS average_sale
             FROM orders",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }

    /// Sum of totals for orders created at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales_since(&self, since: DateTime<Utc>) -> Result<Decimal, RepositoryError> {
        let sum: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price), 0) FROM orders WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_one(self.pool)
        .await?;

        Ok(sum)
    }

    async fn items_for(&self, order_id: i32) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, product_id, name, description, qty, unit_price
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }
}

//! Order repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use libra_core::order::summarize_items;
use libra_core::{
    NewOrder, Order, OrderId, OrderItem, OrderItemId, OrderStore, OrderSummary, OrderWithItems,
    Price, ProductId, StoreError,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use super::{RepositoryError, quantity_to_db};

/// Database row for `shop.orders`.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_name: String,
    phone: String,
    address: String,
    note: Option<String>,
    total_price: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            customer_name: row.customer_name,
            phone: row.phone,
            address: row.address,
            note: row.note,
            total_price: Price::new(row.total_price),
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Database row for `shop.order_items`.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    unit_price: Decimal,
    title_snapshot: String,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: Price::new(row.unit_price),
            title_snapshot: row.title_snapshot,
        }
    }
}

const ORDER_COLUMNS: &str =
    "id, customer_name, phone, address, note, total_price, status, created_at";

/// Repository for orders and their items.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the order header and every item in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// committed in that case.
    #[instrument(skip_all, fields(items = order.items.len()))]
    pub async fn insert(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (order_id,): (OrderId,) = sqlx::query_as(
            r"
            INSERT INTO shop.orders
                (customer_name, phone, address, note, total_price, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(&order.customer.name)
        .bind(&order.customer.phone)
        .bind(&order.customer.address)
        .bind(order.customer.note.as_deref())
        .bind(order.total.amount())
        .bind(order.status.as_str())
        .bind(order.placed_at)
        .fetch_one(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                r"
                INSERT INTO shop.order_items
                    (order_id, product_id, quantity, unit_price, title_snapshot)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(quantity_to_db(item.quantity)?)
            .bind(item.unit_price.amount())
            .bind(&item.title_snapshot)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order_id)
    }

    /// Set an order's status. Returns whether a row was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: OrderId, status: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE shop.orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Orders newest first, optionally filtered by exact status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<OrderSummary>, RepositoryError> {
        let orders = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM shop.orders
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        let lines: Vec<(OrderId, String, i32)> = sqlx::query_as(
            r"
            SELECT order_id, title_snapshot, quantity
            FROM shop.order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, id
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<(String, i64)>> = HashMap::new();
        for (order_id, title, quantity) in lines {
            by_order
                .entry(order_id)
                .or_default()
                .push((title, i64::from(quantity)));
        }

        Ok(orders
            .into_iter()
            .map(|row| {
                let items_summary = by_order.get(&row.id).map_or_else(String::new, |lines| {
                    summarize_items(lines.iter().map(|(t, q)| (t.as_str(), *q)))
                });
                OrderSummary {
                    order: Order::from(row),
                    items_summary,
                }
            })
            .collect())
    }

    /// A single order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let Some(order) = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_id, quantity, unit_price, title_snapshot
            FROM shop.order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrderWithItems {
            order: Order::from(order),
            items: items.into_iter().map(OrderItem::from).collect(),
        }))
    }
}

impl OrderStore for OrderRepository {
    async fn create_order(&self, order: &NewOrder) -> Result<OrderId, StoreError> {
        Ok(self.insert(order).await?)
    }

    async fn update_status(&self, id: OrderId, status: &str) -> Result<bool, StoreError> {
        Ok(self.set_status(id, status).await?)
    }

    async fn list_orders(&self, status: Option<&str>) -> Result<Vec<OrderSummary>, StoreError> {
        Ok(self.list(status).await?)
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<OrderWithItems>, StoreError> {
        Ok(self.get(id).await?)
    }
}

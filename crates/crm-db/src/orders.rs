//! Database operations for `orders` and `order_products`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use crm_core::query::{contains_pattern, order_by_sql};
use crm_core::{compute_total, OrderFilter, OrderRecord, OrderSort, Page, SortKey};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{DbError, ProductRow};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub customer_id: i64,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderRow> for OrderRecord {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            order_date: row.order_date,
            total_amount: row.total_amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// An order joined with the email of the customer who placed it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderReminderRow {
    pub order_id: i64,
    pub customer_email: String,
    pub order_date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Create an order for `customer_id` containing `product_ids`.
///
/// The total is the sum of the current prices of the distinct products and
/// is written together with the order and its product links in a single
/// transaction. `order_date` defaults to now.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if any product id does not exist when the
/// transaction runs, or [`DbError::Sqlx`] if a statement fails (for example a
/// missing customer violating the foreign key).
pub async fn create_order(
    pool: &PgPool,
    customer_id: i64,
    product_ids: &[i64],
    order_date: Option<DateTime<Utc>>,
) -> Result<OrderRow, DbError> {
    let ids: Vec<i64> = product_ids
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut tx = pool.begin().await?;

    let prices = sqlx::query_scalar::<_, Decimal>(
        "SELECT price FROM products WHERE id = ANY($1) FOR SHARE",
    )
    .bind(&ids)
    .fetch_all(&mut *tx)
    .await?;

    if prices.len() != ids.len() {
        return Err(DbError::NotFound);
    }

    let order = sqlx::query_as::<_, OrderRow>(
        "INSERT INTO orders (customer_id, order_date, total_amount) \
         VALUES ($1, COALESCE($2, NOW()), $3) \
         RETURNING id, customer_id, order_date, total_amount, created_at, updated_at",
    )
    .bind(customer_id)
    .bind(order_date)
    .bind(compute_total(&prices))
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO order_products (order_id, product_id) \
         SELECT $1, UNNEST($2::BIGINT[])",
    )
    .bind(order.id)
    .bind(&ids)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(order)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Fetch one order by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_order(pool: &PgPool, id: i64) -> Result<Option<OrderRow>, DbError> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, customer_id, order_date, total_amount, created_at, updated_at \
         FROM orders WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Products linked to an order, ordered by product id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_order_products(pool: &PgPool, order_id: i64) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT p.id, p.name, p.price, p.stock, p.created_at, p.updated_at \
         FROM order_products op \
         JOIN products p ON p.id = op.product_id \
         WHERE op.order_id = $1 \
         ORDER BY p.id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// List orders matching `filter`, ordered by `sort` and paged.
///
/// Product filters match orders that contain at least one qualifying
/// product; each order appears once.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders(
    pool: &PgPool,
    filter: &OrderFilter,
    sort: &[SortKey<OrderSort>],
    page: Page,
) -> Result<Vec<OrderRow>, DbError> {
    let sql = format!(
        "SELECT o.id, o.customer_id, o.order_date, o.total_amount, o.created_at, o.updated_at \
         FROM orders o \
         JOIN customers c ON c.id = o.customer_id \
         WHERE ($1::NUMERIC IS NULL OR o.total_amount >= $1) \
           AND ($2::NUMERIC IS NULL OR o.total_amount <= $2) \
           AND ($3::DATE IS NULL OR o.order_date >= ($3::DATE::TIMESTAMP AT TIME ZONE 'UTC')) \
           AND ($4::DATE IS NULL OR o.order_date < (($4::DATE + 1)::TIMESTAMP AT TIME ZONE 'UTC')) \
           AND ($5::TEXT IS NULL OR c.name ILIKE $5) \
           AND ($6::TEXT IS NULL OR EXISTS ( \
                SELECT 1 FROM order_products op \
                JOIN products p ON p.id = op.product_id \
                WHERE op.order_id = o.id AND p.name ILIKE $6)) \
           AND ($7::BIGINT IS NULL OR EXISTS ( \
                SELECT 1 FROM order_products op \
                WHERE op.order_id = o.id AND op.product_id = $7)) \
         ORDER BY {} \
         LIMIT $8 OFFSET $9",
        order_by_sql(sort, "o.id"),
    );

    let rows = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(filter.total_amount_gte)
        .bind(filter.total_amount_lte)
        .bind(filter.order_date_gte)
        .bind(filter.order_date_lte)
        .bind(filter.customer_name.as_deref().map(contains_pattern))
        .bind(filter.product_name.as_deref().map(contains_pattern))
        .bind(filter.product_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Orders placed at or after `since`, oldest first, with the customer email.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<Vec<OrderReminderRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderReminderRow>(
        "SELECT o.id AS order_id, c.email AS customer_email, o.order_date \
         FROM orders o \
         JOIN customers c ON c.id = o.customer_id \
         WHERE o.order_date >= $1 \
         ORDER BY o.order_date, o.id",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

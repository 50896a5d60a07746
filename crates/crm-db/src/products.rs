//! Database operations for `products`.

use chrono::{DateTime, Utc};
use crm_core::products::LOW_STOCK_THRESHOLD;
use crm_core::query::{contains_pattern, order_by_sql};
use crm_core::{NewProduct, Page, ProductFilter, ProductRecord, ProductSort, SortKey};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insert a validated product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_product(pool: &PgPool, product: &NewProduct) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products (name, price, stock) \
         VALUES ($1, $2, $3) \
         RETURNING id, name, price, stock, created_at, updated_at",
    )
    .bind(&product.name)
    .bind(product.price)
    .bind(product.stock)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Fetch one product by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, id: i64) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, price, stock, created_at, updated_at \
         FROM products WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch every product whose id is in `ids`, ordered by id. Unknown ids are
/// silently absent from the result.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_products_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<ProductRow>, DbError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, price, stock, created_at, updated_at \
         FROM products WHERE id = ANY($1) ORDER BY id",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// List products matching `filter`, ordered by `sort` and paged.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(
    pool: &PgPool,
    filter: &ProductFilter,
    sort: &[SortKey<ProductSort>],
    page: Page,
) -> Result<Vec<ProductRow>, DbError> {
    let sql = format!(
        "SELECT p.id, p.name, p.price, p.stock, p.created_at, p.updated_at \
         FROM products p \
         WHERE ($1::TEXT IS NULL OR p.name ILIKE $1) \
           AND ($2::NUMERIC IS NULL OR p.price >= $2) \
           AND ($3::NUMERIC IS NULL OR p.price <= $3) \
           AND ($4::INTEGER IS NULL OR p.stock >= $4) \
           AND ($5::INTEGER IS NULL OR p.stock <= $5) \
           AND ($6::INTEGER IS NULL OR p.stock < $6) \
         ORDER BY {} \
         LIMIT $7 OFFSET $8",
        order_by_sql(sort, "p.id"),
    );

    let low_stock_below = filter.low_stock.then_some(LOW_STOCK_THRESHOLD);

    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(filter.name_icontains.as_deref().map(contains_pattern))
        .bind(filter.price_gte)
        .bind(filter.price_lte)
        .bind(filter.stock_gte)
        .bind(filter.stock_lte)
        .bind(low_stock_below)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

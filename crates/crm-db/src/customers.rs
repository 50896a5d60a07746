//! Database operations for `customers`.

use chrono::{DateTime, Utc};
use crm_core::query::{contains_pattern, order_by_sql, prefix_pattern};
use crm_core::{CustomerFilter, CustomerRecord, CustomerSort, CustomerStore, NewCustomer, Page, SortKey};
use sqlx::PgPool;

use crate::DbError;

const CUSTOMER_COLUMNS: &str = "c.id, c.name, c.email, c.phone, c.created_at, c.updated_at";

/// A row from the `customers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for CustomerRecord {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Whether a customer with this email exists, compared case-insensitively.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn customer_email_exists(pool: &PgPool, email: &str) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM customers WHERE LOWER(email) = LOWER($1))",
    )
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Insert every customer inside one transaction and return the rows in
/// input order.
///
/// If any insert fails (including a unique violation on the email index
/// raised by a concurrent writer) the transaction is rolled back and no row
/// from this call is kept.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert or the commit fails.
pub async fn insert_customers(
    pool: &PgPool,
    customers: &[NewCustomer],
) -> Result<Vec<CustomerRow>, DbError> {
    let mut tx = pool.begin().await?;
    let mut rows = Vec::with_capacity(customers.len());

    for customer in customers {
        let row = sqlx::query_as::<_, CustomerRow>(
            "INSERT INTO customers (name, email, phone) \
             VALUES ($1, $2, $3) \
             RETURNING id, name, email, phone, created_at, updated_at",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .fetch_one(&mut *tx)
        .await?;
        rows.push(row);
    }

    tx.commit().await?;
    Ok(rows)
}

/// Fetch one customer by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_customer(pool: &PgPool, id: i64) -> Result<Option<CustomerRow>, DbError> {
    let row = sqlx::query_as::<_, CustomerRow>(
        "SELECT id, name, email, phone, created_at, updated_at \
         FROM customers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// List customers matching `filter`, ordered by `sort` (id ascending as the
/// final tiebreaker) and paged.
///
/// A `phone_pattern` starting with `+` is matched as a prefix, anything else
/// as a substring.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_customers(
    pool: &PgPool,
    filter: &CustomerFilter,
    sort: &[SortKey<CustomerSort>],
    page: Page,
) -> Result<Vec<CustomerRow>, DbError> {
    let sql = format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers c \
         WHERE ($1::TEXT IS NULL OR c.name ILIKE $1) \
           AND ($2::TEXT IS NULL OR c.email ILIKE $2) \
           AND ($3::DATE IS NULL OR c.created_at >= ($3::DATE::TIMESTAMP AT TIME ZONE 'UTC')) \
           AND ($4::DATE IS NULL OR c.created_at < (($4::DATE + 1)::TIMESTAMP AT TIME ZONE 'UTC')) \
           AND ($5::TEXT IS NULL OR c.phone ILIKE $5) \
         ORDER BY {} \
         LIMIT $6 OFFSET $7",
        order_by_sql(sort, "c.id"),
    );

    let phone_pattern = filter.phone_pattern.as_deref().map(|p| {
        if p.starts_with('+') {
            prefix_pattern(p)
        } else {
            contains_pattern(p)
        }
    });

    let rows = sqlx::query_as::<_, CustomerRow>(&sql)
        .bind(filter.name_icontains.as_deref().map(contains_pattern))
        .bind(filter.email_icontains.as_deref().map(contains_pattern))
        .bind(filter.created_at_gte)
        .bind(filter.created_at_lte)
        .bind(phone_pattern)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// [`CustomerStore`] backed by Postgres, used by the intake protocol.
#[derive(Debug, Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CustomerStore for PgCustomerStore {
    type Error = DbError;

    async fn exists_by_email(&self, email: &str) -> Result<bool, DbError> {
        customer_email_exists(&self.pool, email).await
    }

    async fn insert_all(&self, customers: &[NewCustomer]) -> Result<Vec<CustomerRecord>, DbError> {
        let rows = insert_customers(&self.pool, customers).await?;
        Ok(rows.into_iter().map(CustomerRecord::from).collect())
    }
}

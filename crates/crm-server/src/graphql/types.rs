//! GraphQL object, input and payload types.

use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, Utc};
use crm_core::{parse_id, CustomerCandidate, CustomerRecord, OrderRecord, ProductRecord};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::errors::{bad_request, db_error};

fn gql_id(id: i64) -> ID {
    ID(id.to_string())
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

#[derive(SimpleObject, Clone, Debug)]
pub struct Customer {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerRecord> for Customer {
    fn from(record: CustomerRecord) -> Self {
        Self {
            id: gql_id(record.id),
            name: record.name,
            email: record.email,
            phone: record.phone,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Product {
    pub id: ID,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Self {
            id: gql_id(record.id),
            name: record.name,
            price: record.price,
            stock: record.stock,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Order {
    pub id: ID,
    #[graphql(skip)]
    pub pk: i64,
    #[graphql(skip)]
    pub customer_id: i64,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderRecord> for Order {
    fn from(record: OrderRecord) -> Self {
        Self {
            id: gql_id(record.id),
            pk: record.id,
            customer_id: record.customer_id,
            order_date: record.order_date,
            total_amount: record.total_amount,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[ComplexObject]
impl Order {
    async fn customer(&self, ctx: &Context<'_>) -> Result<Option<Customer>> {
        let pool = ctx.data::<PgPool>()?;
        let row = crm_db::get_customer(pool, self.customer_id)
            .await
            .map_err(|e| db_error(&e))?;
        Ok(row.map(|r| CustomerRecord::from(r).into()))
    }

    /// Products on this order, ordered by id.
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        let pool = ctx.data::<PgPool>()?;
        let rows = crm_db::list_order_products(pool, self.pk)
            .await
            .map_err(|e| db_error(&e))?;
        Ok(rows
            .into_iter()
            .map(|r| ProductRecord::from(r).into())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Mutation inputs
// ---------------------------------------------------------------------------

/// Customer fields as submitted. Missing or blank values are reported as
/// validation errors rather than rejected by the GraphQL layer, so that one
/// bad bulk item never fails the whole request.
#[derive(InputObject, Clone, Debug, Default)]
pub struct CreateCustomerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(InputObject, Clone, Debug, Default)]
pub struct BulkCustomerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<CreateCustomerInput> for CustomerCandidate {
    fn from(input: CreateCustomerInput) -> Self {
        Self {
            name: input.name,
            email: input.email,
            phone: input.phone,
        }
    }
}

impl From<BulkCustomerInput> for CustomerCandidate {
    fn from(input: BulkCustomerInput) -> Self {
        Self {
            name: input.name,
            email: input.email,
            phone: input.phone,
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct CreateProductInput {
    pub name: String,
    pub price: f64,
    #[graphql(default = 0)]
    pub stock: i32,
}

impl From<CreateProductInput> for crm_core::ProductInput {
    fn from(input: CreateProductInput) -> Self {
        Self {
            name: input.name,
            price: input.price,
            stock: Some(input.stock),
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct CreateOrderInput {
    pub customer_id: ID,
    pub product_ids: Vec<ID>,
    /// Defaults to the time of creation.
    pub order_date: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

pub const VALIDATION_FAILED: &str = "Validation failed";

#[derive(SimpleObject, Clone, Debug)]
pub struct CreateCustomerPayload {
    pub customer: Option<Customer>,
    pub message: String,
    pub success: bool,
    pub errors: Vec<String>,
}

#[derive(SimpleObject, Clone, Debug)]
pub struct BulkCreateCustomersPayload {
    /// Created customers in commit order.
    pub customers: Vec<Customer>,
    /// `Item {n}: {reason}` for each rejected input, `n` being 1-based.
    pub errors: Vec<String>,
    pub success_count: i32,
    pub total_count: i32,
}

#[derive(SimpleObject, Clone, Debug)]
pub struct CreateProductPayload {
    pub product: Option<Product>,
    pub message: String,
    pub success: bool,
    pub errors: Vec<String>,
}

#[derive(SimpleObject, Clone, Debug)]
pub struct CreateOrderPayload {
    pub order: Option<Order>,
    pub message: String,
    pub success: bool,
    pub errors: Vec<String>,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(InputObject, Clone, Debug, Default)]
pub struct CustomerFilterInput {
    pub name_icontains: Option<String>,
    pub email_icontains: Option<String>,
    pub created_at_gte: Option<NaiveDate>,
    pub created_at_lte: Option<NaiveDate>,
    /// Prefix match when it starts with `+`, substring match otherwise.
    pub phone_pattern: Option<String>,
}

impl From<CustomerFilterInput> for crm_core::CustomerFilter {
    fn from(input: CustomerFilterInput) -> Self {
        Self {
            name_icontains: input.name_icontains,
            email_icontains: input.email_icontains,
            created_at_gte: input.created_at_gte,
            created_at_lte: input.created_at_lte,
            phone_pattern: input.phone_pattern,
        }
    }
}

#[derive(InputObject, Clone, Debug, Default)]
pub struct ProductFilterInput {
    pub name_icontains: Option<String>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i32>,
    pub stock_lte: Option<i32>,
    /// Only products with fewer than 10 units in stock.
    pub low_stock: Option<bool>,
}

impl From<ProductFilterInput> for crm_core::ProductFilter {
    fn from(input: ProductFilterInput) -> Self {
        Self {
            name_icontains: input.name_icontains,
            price_gte: input.price_gte,
            price_lte: input.price_lte,
            stock_gte: input.stock_gte,
            stock_lte: input.stock_lte,
            low_stock: input.low_stock.unwrap_or(false),
        }
    }
}

#[derive(InputObject, Clone, Debug, Default)]
pub struct OrderFilterInput {
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
    pub order_date_gte: Option<NaiveDate>,
    pub order_date_lte: Option<NaiveDate>,
    pub customer_name: Option<String>,
    pub product_name: Option<String>,
    pub product_id: Option<ID>,
}

impl TryFrom<OrderFilterInput> for crm_core::OrderFilter {
    type Error = async_graphql::Error;

    fn try_from(input: OrderFilterInput) -> Result<Self> {
        let product_id = match input.product_id {
            Some(raw) => Some(
                parse_id(raw.as_str())
                    .ok_or_else(|| bad_request(format!("Invalid product ID: {}", raw.as_str())))?,
            ),
            None => None,
        };

        Ok(Self {
            total_amount_gte: input.total_amount_gte,
            total_amount_lte: input.total_amount_lte,
            order_date_gte: input.order_date_gte,
            order_date_lte: input.order_date_lte,
            customer_name: input.customer_name,
            product_name: input.product_name,
            product_id,
        })
    }
}

use async_graphql::{Context, Object, Result, ID};
use crm_core::{
    parse_id, parse_order_by, CustomerFilter, CustomerRecord, CustomerSort, OrderFilter,
    OrderRecord, OrderSort, Page, ProductFilter, ProductRecord, ProductSort, SortField, SortKey,
};
use sqlx::PgPool;

use super::errors::{bad_request, db_error};
use super::types::{
    Customer, CustomerFilterInput, Order, OrderFilterInput, Product, ProductFilterInput,
};

pub struct QueryRoot;

fn sort_keys<F: SortField>(order_by: Option<&str>) -> Result<Vec<SortKey<F>>> {
    parse_order_by::<F>(order_by.unwrap_or_default()).map_err(|e| bad_request(e.to_string()))
}

fn page(limit: Option<i32>, offset: Option<i32>) -> Page {
    Page::new(limit.map(i64::from), offset.map(i64::from))
}

#[Object]
impl QueryRoot {
    async fn hello(&self) -> &'static str {
        "Hello, GraphQL!"
    }

    /// Customers matching `filter`. `orderBy` is a comma-separated list of
    /// fields, `-` for descending (e.g. `"-createdAt,name"`).
    async fn all_customers(
        &self,
        ctx: &Context<'_>,
        filter: Option<CustomerFilterInput>,
        order_by: Option<String>,
        #[graphql(desc = "Page size, default 50, at most 200")] limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Vec<Customer>> {
        let pool = ctx.data::<PgPool>()?;
        let sort = sort_keys::<CustomerSort>(order_by.as_deref())?;
        let filter: CustomerFilter = filter.unwrap_or_default().into();

        let rows = crm_db::list_customers(pool, &filter, &sort, page(limit, offset))
            .await
            .map_err(|e| db_error(&e))?;
        Ok(rows
            .into_iter()
            .map(|r| CustomerRecord::from(r).into())
            .collect())
    }

    async fn customer(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Customer>> {
        let Some(id) = parse_id(id.as_str()) else {
            return Ok(None);
        };
        let pool = ctx.data::<PgPool>()?;
        let row = crm_db::get_customer(pool, id)
            .await
            .map_err(|e| db_error(&e))?;
        Ok(row.map(|r| CustomerRecord::from(r).into()))
    }

    async fn all_products(
        &self,
        ctx: &Context<'_>,
        filter: Option<ProductFilterInput>,
        order_by: Option<String>,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Vec<Product>> {
        let pool = ctx.data::<PgPool>()?;
        let sort = sort_keys::<ProductSort>(order_by.as_deref())?;
        let filter: ProductFilter = filter.unwrap_or_default().into();

        let rows = crm_db::list_products(pool, &filter, &sort, page(limit, offset))
            .await
            .map_err(|e| db_error(&e))?;
        Ok(rows
            .into_iter()
            .map(|r| ProductRecord::from(r).into())
            .collect())
    }

    async fn product(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Product>> {
        let Some(id) = parse_id(id.as_str()) else {
            return Ok(None);
        };
        let pool = ctx.data::<PgPool>()?;
        let row = crm_db::get_product(pool, id)
            .await
            .map_err(|e| db_error(&e))?;
        Ok(row.map(|r| ProductRecord::from(r).into()))
    }

    /// Orders matching `filter`. Product filters match orders containing at
    /// least one qualifying product, without repeating the order.
    async fn all_orders(
        &self,
        ctx: &Context<'_>,
        filter: Option<OrderFilterInput>,
        order_by: Option<String>,
        limit: Option<i32>,
        offset: Option<i32>,
    ) -> Result<Vec<Order>> {
        let pool = ctx.data::<PgPool>()?;
        let sort = sort_keys::<OrderSort>(order_by.as_deref())?;
        let filter = OrderFilter::try_from(filter.unwrap_or_default())?;

        let rows = crm_db::list_orders(pool, &filter, &sort, page(limit, offset))
            .await
            .map_err(|e| db_error(&e))?;
        Ok(rows
            .into_iter()
            .map(|r| OrderRecord::from(r).into())
            .collect())
    }

    async fn order(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Order>> {
        let Some(id) = parse_id(id.as_str()) else {
            return Ok(None);
        };
        let pool = ctx.data::<PgPool>()?;
        let row = crm_db::get_order(pool, id)
            .await
            .map_err(|e| db_error(&e))?;
        Ok(row.map(|r| OrderRecord::from(r).into()))
    }
}

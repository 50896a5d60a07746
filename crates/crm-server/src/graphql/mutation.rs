use std::collections::HashSet;

use async_graphql::{Context, Object, Result};
use crm_core::{
    bulk_create_customers, compute_total, create_customer, normalize_email, parse_id,
    unknown_ids, validate_product, CandidateError, CustomerCandidate, IntakeError, OrderRecord,
    ProductInput, ProductRecord, MAX_ORDER_TOTAL,
};
use crm_db::{DbError, PgCustomerStore};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::errors::{bad_request, conflict, db_error, internal};
use super::types::{
    BulkCreateCustomersPayload, BulkCustomerInput, CreateCustomerInput, CreateCustomerPayload,
    CreateOrderInput, CreateOrderPayload, CreateProductInput, CreateProductPayload,
    VALIDATION_FAILED,
};
use super::IntakeLimits;

pub struct MutationRoot;

fn intake_error(err: IntakeError<DbError>) -> async_graphql::Error {
    match err {
        IntakeError::BatchTooLarge { .. } => bad_request(err.to_string()),
        IntakeError::Storage(e) if e.is_unique_violation() => {
            tracing::warn!(error = %e, "customer intake lost an email race; batch rolled back");
            conflict("a customer email was registered concurrently; no customers were created")
        }
        IntakeError::Storage(e) => db_error(&e),
        IntakeError::IncompleteInsert { .. } => internal(err.to_string()),
    }
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

#[Object]
impl MutationRoot {
    /// Create one customer with the same rules as a bulk item.
    async fn create_customer(
        &self,
        ctx: &Context<'_>,
        input: CreateCustomerInput,
    ) -> Result<CreateCustomerPayload> {
        let pool = ctx.data::<PgPool>()?;
        let store = PgCustomerStore::new(pool.clone());
        let candidate = CustomerCandidate::from(input);

        let reason = match create_customer(&store, &candidate).await {
            Ok(Ok(record)) => {
                tracing::info!(customer_id = record.id, "customer created");
                return Ok(CreateCustomerPayload {
                    customer: Some(record.into()),
                    message: "Customer created successfully".to_string(),
                    success: true,
                    errors: Vec::new(),
                });
            }
            Ok(Err(reason)) => reason,
            // Another request inserted the same email between the lookup and the insert.
            Err(IntakeError::Storage(e)) if e.is_unique_violation() => {
                let email = candidate.email.as_deref().unwrap_or_default();
                CandidateError::EmailExists(normalize_email(email))
            }
            Err(e) => return Err(intake_error(e)),
        };

        Ok(CreateCustomerPayload {
            customer: None,
            message: VALIDATION_FAILED.to_string(),
            success: false,
            errors: vec![reason.to_string()],
        })
    }

    /// Validate every input independently and create the valid ones in a
    /// single transaction. Invalid inputs are reported in `errors` and never
    /// fail the request.
    async fn bulk_create_customers(
        &self,
        ctx: &Context<'_>,
        input: Vec<BulkCustomerInput>,
    ) -> Result<BulkCreateCustomersPayload> {
        let pool = ctx.data::<PgPool>()?;
        let limits = ctx.data::<IntakeLimits>()?;
        let store = PgCustomerStore::new(pool.clone());
        let candidates: Vec<CustomerCandidate> = input.into_iter().map(Into::into).collect();

        let result = bulk_create_customers(&store, &candidates, limits.max_batch)
            .await
            .map_err(intake_error)?;

        tracing::info!(
            submitted = candidates.len(),
            created = result.created.len(),
            rejected = result.errors.len(),
            "bulk customer intake finished"
        );

        Ok(BulkCreateCustomersPayload {
            success_count: count(result.created.len()),
            total_count: count(result.total_count()),
            errors: result.error_messages(),
            customers: result.created.into_iter().map(Into::into).collect(),
        })
    }

    async fn create_product(
        &self,
        ctx: &Context<'_>,
        input: CreateProductInput,
    ) -> Result<CreateProductPayload> {
        let product = match validate_product(&ProductInput::from(input)) {
            Ok(product) => product,
            Err(errors) => {
                return Ok(CreateProductPayload {
                    product: None,
                    message: VALIDATION_FAILED.to_string(),
                    success: false,
                    errors,
                })
            }
        };

        let pool = ctx.data::<PgPool>()?;
        let row = crm_db::create_product(pool, &product)
            .await
            .map_err(|e| db_error(&e))?;
        tracing::info!(product_id = row.id, "product created");

        Ok(CreateProductPayload {
            product: Some(ProductRecord::from(row).into()),
            message: "Product created successfully".to_string(),
            success: true,
            errors: Vec::new(),
        })
    }

    /// Create an order whose total is the sum of its distinct products' prices.
    async fn create_order(
        &self,
        ctx: &Context<'_>,
        input: CreateOrderInput,
    ) -> Result<CreateOrderPayload> {
        let pool = ctx.data::<PgPool>()?;
        let mut errors = Vec::new();

        let customer = match parse_id(input.customer_id.as_str()) {
            Some(id) => crm_db::get_customer(pool, id)
                .await
                .map_err(|e| db_error(&e))?,
            None => None,
        };
        if customer.is_none() {
            errors.push("Invalid customer ID.".to_string());
        }

        let raw_ids: Vec<String> = input
            .product_ids
            .iter()
            .map(|id| id.as_str().to_owned())
            .collect();
        let product_ids: Vec<i64> = raw_ids.iter().filter_map(|raw| parse_id(raw)).collect();
        if raw_ids.is_empty() {
            errors.push("Select at least one product.".to_string());
        } else {
            let products = crm_db::get_products_by_ids(pool, &product_ids)
                .await
                .map_err(|e| db_error(&e))?;
            let found: HashSet<i64> = products.iter().map(|p| p.id).collect();
            let bad = unknown_ids(&raw_ids, &found);
            if !bad.is_empty() {
                errors.push(format!("Invalid product ID(s): {}", bad.join(", ")));
            }

            let prices: Vec<Decimal> = products.iter().map(|p| p.price).collect();
            if compute_total(&prices) > MAX_ORDER_TOTAL {
                errors.push("Order total is too large.".to_string());
            }
        }

        let Some(customer) = customer.filter(|_| errors.is_empty()) else {
            return Ok(CreateOrderPayload {
                order: None,
                message: VALIDATION_FAILED.to_string(),
                success: false,
                errors,
            });
        };

        let row = match crm_db::create_order(pool, customer.id, &product_ids, input.order_date).await
        {
            Ok(row) => row,
            // A product was deleted after validation.
            Err(DbError::NotFound) => {
                return Ok(CreateOrderPayload {
                    order: None,
                    message: VALIDATION_FAILED.to_string(),
                    success: false,
                    errors: vec!["Invalid product ID(s).".to_string()],
                })
            }
            Err(e) => return Err(db_error(&e)),
        };

        tracing::info!(
            order_id = row.id,
            customer_id = customer.id,
            total = %row.total_amount,
            "order created"
        );

        Ok(CreateOrderPayload {
            order: Some(OrderRecord::from(row).into()),
            message: "Order created successfully".to_string(),
            success: true,
            errors: Vec::new(),
        })
    }
}

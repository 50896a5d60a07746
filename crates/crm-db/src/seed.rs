use crm_core::{NewCustomer, NewProduct};
use rand::seq::IndexedRandom;
use rand::Rng;
use sqlx::PgPool;

use crate::{create_order, DbError, OrderRow};

/// Ids of the seeded catalog, in fixture order, and how many rows were new.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub customer_ids: Vec<i64>,
    pub product_ids: Vec<i64>,
    pub customers_created: usize,
    pub products_created: usize,
}

/// Get-or-create customers by email and products by name.
///
/// Existing rows are left untouched, so running the seed twice does not
/// duplicate anything. Everything runs in one transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_catalog(
    pool: &PgPool,
    customers: &[NewCustomer],
    products: &[NewProduct],
) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for customer in customers {
        let inserted: Option<i64> = sqlx::query_scalar(
            "INSERT INTO customers (name, email, phone) \
             VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING \
             RETURNING id",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .fetch_optional(&mut *tx)
        .await?;

        let id = match inserted {
            Some(id) => {
                summary.customers_created += 1;
                id
            }
            None => {
                sqlx::query_scalar("SELECT id FROM customers WHERE LOWER(email) = LOWER($1)")
                    .bind(&customer.email)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };
        summary.customer_ids.push(id);
    }

    for product in products {
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM products WHERE LOWER(name) = LOWER($1) ORDER BY id LIMIT 1",
        )
        .bind(&product.name)
        .fetch_optional(&mut *tx)
        .await?;

        let id = match existing {
            Some(id) => id,
            None => {
                summary.products_created += 1;
                sqlx::query_scalar(
                    "INSERT INTO products (name, price, stock) VALUES ($1, $2, $3) RETURNING id",
                )
                .bind(&product.name)
                .bind(product.price)
                .bind(product.stock)
                .fetch_one(&mut *tx)
                .await?
            }
        };
        summary.product_ids.push(id);
    }

    tx.commit().await?;
    Ok(summary)
}

/// Pick `count` random orders: a random customer and one to three distinct
/// random products each. Returns an empty plan when either side is empty.
pub fn plan_orders<R: Rng + ?Sized>(
    rng: &mut R,
    customer_ids: &[i64],
    product_ids: &[i64],
    count: usize,
) -> Vec<(i64, Vec<i64>)> {
    if customer_ids.is_empty() || product_ids.is_empty() {
        return Vec::new();
    }

    let max_lines = product_ids.len().min(3);
    (0..count)
        .filter_map(|_| {
            let customer_id = *customer_ids.choose(rng)?;
            let lines = rng.random_range(1..=max_lines);
            let products = product_ids.choose_multiple(rng, lines).copied().collect();
            Some((customer_id, products))
        })
        .collect()
}

/// Create the planned orders, each in its own transaction.
///
/// # Errors
///
/// Returns [`DbError`] from the first order that fails; earlier orders stay
/// committed.
pub async fn seed_orders(pool: &PgPool, plan: &[(i64, Vec<i64>)]) -> Result<Vec<OrderRow>, DbError> {
    let mut orders = Vec::with_capacity(plan.len());
    for (customer_id, product_ids) in plan {
        let order = create_order(pool, *customer_id, product_ids, None).await?;
        tracing::debug!(order_id = order.id, customer_id, total = %order.total_amount, "seeded order");
        orders.push(order);
    }
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn plan_orders_uses_one_to_three_distinct_products() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan = plan_orders(&mut rng, &[1, 2], &[10, 11, 12, 13, 14], 50);

        assert_eq!(plan.len(), 50);
        for (customer_id, products) in &plan {
            assert!([1, 2].contains(customer_id));
            assert!((1..=3).contains(&products.len()));
            let distinct: HashSet<_> = products.iter().collect();
            assert_eq!(distinct.len(), products.len());
        }
    }

    #[test]
    fn plan_orders_caps_lines_at_catalog_size() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = plan_orders(&mut rng, &[1], &[10], 10);
        assert!(plan.iter().all(|(_, products)| products == &vec![10]));
    }

    #[test]
    fn plan_orders_is_empty_without_customers_or_products() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(plan_orders(&mut rng, &[], &[1], 3).is_empty());
        assert!(plan_orders(&mut rng, &[1], &[], 3).is_empty());
    }
}

//! GraphQL surface: customers, products and orders.

mod errors;
mod mutation;
mod query;
mod types;

use async_graphql::{EmptySubscription, Schema};
use sqlx::PgPool;

pub use errors::codes;
pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type CrmSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Bounds applied to bulk intake requests.
#[derive(Debug, Clone, Copy)]
pub struct IntakeLimits {
    pub max_batch: usize,
}

/// Build the schema with the pool and intake limits as context data.
/// Query depth is capped at 10 levels.
pub fn build_schema(pool: PgPool, limits: IntakeLimits) -> CrmSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .limit_depth(10)
        .data(pool)
        .data(limits)
        .finish()
}

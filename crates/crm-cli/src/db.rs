//! `db` sub-commands: connectivity, migrations and fixture seeding.

use clap::Subcommand;
use sqlx::PgPool;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Load the seed fixture and create random orders
    Seed {
        /// Seed file (defaults to `CRM_SEED_PATH`)
        #[arg(long)]
        file: Option<std::path::PathBuf>,
        /// Override the number of random orders from the seed file
        #[arg(long)]
        orders: Option<usize>,
    },
}

pub(crate) async fn run(
    pool: &PgPool,
    config: &crm_core::AppConfig,
    command: DbCommands,
) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            crm_db::ping(pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = crm_db::run_migrations(pool).await?;
            println!("migrations up to date ({applied} applied)");
        }
        DbCommands::Seed { file, orders } => {
            let path = file.unwrap_or_else(|| config.seed_path.clone());
            run_seed(pool, &path, orders).await?;
        }
    }
    Ok(())
}

/// Seed customers and products idempotently, then add random orders.
///
/// Orders are not deduplicated: every run adds `orders` more.
async fn run_seed(
    pool: &PgPool,
    path: &std::path::Path,
    orders: Option<usize>,
) -> anyhow::Result<()> {
    let seed = crm_core::load_seed_file(path)?;
    let order_count = orders.unwrap_or(seed.orders);

    let summary = crm_db::seed_catalog(pool, &seed.customers, &seed.products).await?;
    println!(
        "customers: {} new, {} total; products: {} new, {} total",
        summary.customers_created,
        summary.customer_ids.len(),
        summary.products_created,
        summary.product_ids.len()
    );

    let plan = crm_db::plan_orders(
        &mut rand::rng(),
        &summary.customer_ids,
        &summary.product_ids,
        order_count,
    );
    let created = crm_db::seed_orders(pool, &plan).await?;
    for order in &created {
        println!(
            "order {} for customer {}: {}",
            order.id, order.customer_id, order.total_amount
        );
    }
    tracing::info!(
        path = %path.display(),
        orders = created.len(),
        "seed complete"
    );
    Ok(())
}

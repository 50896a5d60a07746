//! `customers` sub-commands.
//!
//! `import` feeds a JSON array of customer objects through the same bulk
//! intake the GraphQL mutation uses, so the batch limit and error messages
//! are identical.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use crm_core::CustomerCandidate;
use crm_db::PgCustomerStore;
use sqlx::PgPool;

#[derive(Debug, Subcommand)]
pub enum CustomersCommands {
    /// Bulk-create customers from a JSON file
    Import {
        /// Path to a JSON array of `{ "name", "email", "phone" }` objects
        file: PathBuf,
    },
}

pub(crate) async fn run(
    pool: &PgPool,
    config: &crm_core::AppConfig,
    command: CustomersCommands,
) -> anyhow::Result<()> {
    match command {
        CustomersCommands::Import { file } => {
            let candidates = read_candidates(&file)?;
            let store = PgCustomerStore::new(pool.clone());
            let result =
                crm_core::bulk_create_customers(&store, &candidates, config.bulk_max_batch).await?;

            for customer in &result.created {
                println!("created {} <{}> (id {})", customer.name, customer.email, customer.id);
            }
            for message in result.error_messages() {
                eprintln!("{message}");
            }
            println!(
                "{} of {} customers created",
                result.created.len(),
                result.total_count()
            );
            tracing::info!(
                file = %file.display(),
                created = result.created.len(),
                rejected = result.errors.len(),
                "customer import finished"
            );
        }
    }
    Ok(())
}

/// Parse an import file into intake candidates.
pub(crate) fn read_candidates(path: &Path) -> anyhow::Result<Vec<CustomerCandidate>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of customers", path.display()))
}

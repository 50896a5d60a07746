mod customers;
mod db;
mod jobs;

use clap::{Parser, Subcommand};

use crate::customers::CustomersCommands;
use crate::db::DbCommands;
use crate::jobs::RemindersCommands;

#[derive(Debug, Parser)]
#[command(name = "crm-cli")]
#[command(about = "CRM command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Customer intake
    Customers {
        #[command(subcommand)]
        command: CustomersCommands,
    },
    /// Order reminders
    Reminders {
        #[command(subcommand)]
        command: RemindersCommands,
    },
    /// Probe the GraphQL endpoint once and append the result to the heartbeat log
    Heartbeat {
        /// Endpoint to probe (defaults to `CRM_GRAPHQL_URL`)
        #[arg(long)]
        url: Option<String>,
        /// Request timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("crm-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = crm_core::load_app_config()?;
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Db { command } => db::run(&connect(&config).await?, &config, command).await,
        Commands::Customers { command } => {
            customers::run(&connect(&config).await?, &config, command).await
        }
        Commands::Reminders { command } => {
            jobs::run_reminders(&connect(&config).await?, &config, command).await
        }
        Commands::Heartbeat { url, timeout_secs } => {
            jobs::run_heartbeat(&config, url.as_deref(), timeout_secs).await
        }
    }
}

async fn connect(config: &crm_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = crm_db::PoolConfig::from_app_config(config);
    Ok(crm_db::connect_pool(&config.database_url, pool_config).await?)
}

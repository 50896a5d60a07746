//! One-shot runs of the scheduled jobs.

use std::time::Duration;

use clap::Subcommand;
use sqlx::PgPool;

#[derive(Debug, Subcommand)]
pub enum RemindersCommands {
    /// Log a reminder for every order placed in the last seven days
    Send,
}

pub(crate) async fn run_reminders(
    pool: &PgPool,
    config: &crm_core::AppConfig,
    command: RemindersCommands,
) -> anyhow::Result<()> {
    match command {
        RemindersCommands::Send => {
            let count =
                crm_jobs::run_order_reminders(pool, &config.reminders_log_path, chrono::Utc::now())
                    .await?;
            println!(
                "{count} reminder(s) written to {}",
                config.reminders_log_path.display()
            );
        }
    }
    Ok(())
}

pub(crate) async fn run_heartbeat(
    config: &crm_core::AppConfig,
    url: Option<&str>,
    timeout_secs: u64,
) -> anyhow::Result<()> {
    let url = url.unwrap_or(&config.graphql_url);
    let client = crm_jobs::HeartbeatClient::new(url, Duration::from_secs(timeout_secs))?;
    let status = crm_jobs::run_heartbeat(&client, &config.heartbeat_log_path).await?;
    println!("{status}");
    Ok(())
}

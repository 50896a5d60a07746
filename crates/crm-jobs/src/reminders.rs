//! Reminders for recently placed orders.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::{append_lines, JobError};

/// Orders placed within this many days before the run are reminded.
pub const REMINDER_WINDOW_DAYS: i64 = 7;

#[must_use]
pub fn reminder_line(order_id: i64, customer_email: &str) -> String {
    format!("Reminder: Order {order_id} for {customer_email}")
}

/// Append one reminder line per order placed in the last
/// [`REMINDER_WINDOW_DAYS`] days before `now`. Returns the number of
/// reminders written.
///
/// # Errors
///
/// Returns [`JobError::Db`] if the orders cannot be loaded, or
/// [`JobError::LogFile`] if the log cannot be written.
pub async fn run_order_reminders(
    pool: &PgPool,
    log_path: &Path,
    now: DateTime<Utc>,
) -> Result<usize, JobError> {
    let since = now - Duration::days(REMINDER_WINDOW_DAYS);
    let orders = crm_db::list_orders_since(pool, since).await?;

    if orders.is_empty() {
        tracing::info!(%since, "reminders: no recent orders");
        return Ok(0);
    }

    let lines: Vec<String> = orders
        .iter()
        .map(|o| reminder_line(o.order_id, &o.customer_email))
        .collect();
    append_lines(log_path, &lines).await?;

    tracing::info!(count = lines.len(), "Order reminders processed!");
    Ok(lines.len())
}

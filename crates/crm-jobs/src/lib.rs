//! Recurring jobs shared by the server scheduler and the CLI: the GraphQL
//! heartbeat probe and the weekly order reminders.

pub mod error;
pub mod heartbeat;
pub mod logfile;
pub mod reminders;

pub use error::JobError;
pub use heartbeat::{heartbeat_line, run_heartbeat, HeartbeatClient, HeartbeatStatus};
pub use logfile::append_lines;
pub use reminders::{reminder_line, run_order_reminders, REMINDER_WINDOW_DAYS};

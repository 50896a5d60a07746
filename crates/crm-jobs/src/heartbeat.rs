//! GraphQL liveness probe.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;

use crate::{append_lines, JobError};

const PROBE_QUERY: &str = "{ hello }";

/// Outcome of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatStatus {
    Ok,
    /// The endpoint answered with a non-success HTTP status.
    Error(u16),
    /// The request never got a response (connection refused, timeout, ...).
    Unreachable(String),
}

impl fmt::Display for HeartbeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeartbeatStatus::Ok => f.write_str("GraphQL OK"),
            HeartbeatStatus::Error(status) => write!(f, "GraphQL ERROR {status}"),
            HeartbeatStatus::Unreachable(reason) => write!(f, "GraphQL unreachable: {reason}"),
        }
    }
}

/// HTTP client that posts the `{ hello }` query to a GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct HeartbeatClient {
    client: Client,
    url: String,
}

impl HeartbeatClient {
    /// # Errors
    ///
    /// Returns [`JobError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, JobError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Probe the endpoint. Never fails: transport errors become
    /// [`HeartbeatStatus::Unreachable`].
    pub async fn probe(&self) -> HeartbeatStatus {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "query": PROBE_QUERY }))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => HeartbeatStatus::Ok,
            Ok(resp) => HeartbeatStatus::Error(resp.status().as_u16()),
            Err(e) => HeartbeatStatus::Unreachable(e.to_string()),
        }
    }
}

/// `DD/MM/YYYY-HH:MM:SS CRM is alive (<status>)`
#[must_use]
pub fn heartbeat_line(at: DateTime<Utc>, status: &HeartbeatStatus) -> String {
    format!("{} CRM is alive ({status})", at.format("%d/%m/%Y-%H:%M:%S"))
}

/// Probe once and append the heartbeat line to `log_path`.
///
/// # Errors
///
/// Returns [`JobError::LogFile`] if the log line cannot be written. An
/// unreachable endpoint is not an error; it is recorded in the line.
pub async fn run_heartbeat(
    client: &HeartbeatClient,
    log_path: &Path,
) -> Result<HeartbeatStatus, JobError> {
    let status = client.probe().await;
    match &status {
        HeartbeatStatus::Ok => tracing::debug!(url = %client.url, "heartbeat: GraphQL OK"),
        other => tracing::warn!(url = %client.url, status = %other, "heartbeat: GraphQL check failed"),
    }

    append_lines(log_path, &[heartbeat_line(Utc::now(), &status)]).await?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn heartbeat_line_uses_day_first_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(
            heartbeat_line(at, &HeartbeatStatus::Ok),
            "03/02/2026-04:05:06 CRM is alive (GraphQL OK)"
        );
        assert_eq!(
            heartbeat_line(at, &HeartbeatStatus::Error(502)),
            "03/02/2026-04:05:06 CRM is alive (GraphQL ERROR 502)"
        );
    }

    #[test]
    fn unreachable_status_includes_reason() {
        let status = HeartbeatStatus::Unreachable("connection refused".to_string());
        assert_eq!(status.to_string(), "GraphQL unreachable: connection refused");
    }
}

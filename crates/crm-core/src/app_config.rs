use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Upper bound on the number of candidates accepted by one bulk intake call.
    pub bulk_max_batch: usize,
    /// Endpoint the heartbeat job probes with a `{ hello }` query.
    pub graphql_url: String,
    pub heartbeat_log_path: PathBuf,
    pub reminders_log_path: PathBuf,
    pub seed_path: PathBuf,
    pub scheduler_enabled: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("bulk_max_batch", &self.bulk_max_batch)
            .field("graphql_url", &self.graphql_url)
            .field("heartbeat_log_path", &self.heartbeat_log_path)
            .field("reminders_log_path", &self.reminders_log_path)
            .field("seed_path", &self.seed_path)
            .field("scheduler_enabled", &self.scheduler_enabled)
            .finish()
    }
}

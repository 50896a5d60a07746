pub mod app_config;
pub mod config;
pub mod customers;
pub mod intake;
pub mod orders;
pub mod products;
pub mod query;
pub mod seed;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use customers::{
    check_candidate, is_valid_email, is_valid_phone, normalize_email, CandidateError,
    CustomerCandidate, CustomerRecord, NewCustomer,
};
pub use intake::{
    bulk_create_customers, create_customer, BatchResult, CustomerStore, IntakeError, ItemError,
};
pub use orders::{
    compute_total, parse_id, unknown_ids, OrderInput, OrderRecord, MAX_ORDER_TOTAL,
};
pub use products::{validate_product, NewProduct, ProductInput, ProductRecord, MAX_PRICE};
pub use query::{
    normalize_limit, parse_order_by, CustomerFilter, CustomerSort, OrderFilter, OrderSort, Page,
    ProductFilter, ProductSort, SortDirection, SortField, SortKey,
};
pub use seed::{load_seed_file, SeedData, SeedFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown sort field '{field}'; expected one of: {allowed}")]
    InvalidSortField { field: String, allowed: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read seed file {path}: {source}")]
    SeedFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed file: {0}")]
    SeedFileParse(#[source] serde_yaml::Error),
    #[error("seed validation failed: {0}")]
    Validation(String),
}

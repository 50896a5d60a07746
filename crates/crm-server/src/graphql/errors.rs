//! GraphQL error builders.
//!
//! Validation outcomes travel in mutation payloads; only request-level
//! problems and storage failures become GraphQL errors, each tagged with a
//! `code` extension.

use async_graphql::{Error, ErrorExtensions};

pub mod codes {
    /// Storage or other server-side failure.
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    /// Malformed arguments, such as an unknown `orderBy` field.
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    /// A concurrent writer invalidated the request; nothing was committed.
    pub const CONFLICT: &str = "CONFLICT";
}

fn with_code(message: impl Into<String>, code: &'static str) -> Error {
    Error::new(message).extend_with(|_, e| e.set("code", code))
}

/// Log a storage failure and hide its details from the client.
pub fn db_error(err: &crm_db::DbError) -> Error {
    tracing::error!(error = %err, "database query failed");
    with_code("database query failed", codes::INTERNAL_ERROR)
}

/// Log a server-side invariant break and report it as an internal error.
pub fn internal(message: impl Into<String>) -> Error {
    let message = message.into();
    tracing::error!(error = %message, "internal error");
    with_code(message, codes::INTERNAL_ERROR)
}

pub fn bad_request(message: impl Into<String>) -> Error {
    with_code(message, codes::BAD_REQUEST)
}

pub fn conflict(message: impl Into<String>) -> Error {
    with_code(message, codes::CONFLICT)
}

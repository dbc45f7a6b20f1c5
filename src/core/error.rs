//! Error types for the fetch and persistence paths.
//!
//! Each failure mode gets its own variant so callers (and logs) can tell a
//! slow upstream apart from a malformed payload. Nothing here is retried.

use std::time::Duration;
use thiserror::Error;

/// Failure while fetching a quote from the upstream API.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The outbound request could not be built (bad URL).
    #[error("Failed to build request for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// DNS, connect or other transport failure.
    #[error("Request error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The deadline elapsed before the response was fully read.
    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    /// The response body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The payload parsed but did not carry the expected currency pair.
    #[error("No quote found for currency pair: {0}")]
    MissingPair(String),
}

/// Failure while persisting or reading stored quotes.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    Open(#[source] rusqlite::Error),

    #[error("Failed to create table: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("Failed to prepare statement: {0}")]
    Prepare(#[source] rusqlite::Error),

    #[error("Failed to execute statement: {0}")]
    Execute(#[source] rusqlite::Error),

    #[error("Failed to query stored quotes: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database is not available")]
    Unavailable,

    /// The blocking task running the statement panicked or was cancelled.
    #[error("Database worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

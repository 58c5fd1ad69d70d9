#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Filter-query construction and spatial search over the seismic event
//! catalog.
//!
//! [`query::QueryBuilder`] turns validated
//! [`FilterCriteria`](seismo_map_database_models::FilterCriteria) into a pair
//! of parameterized queries (rows and count). [`search`] runs them against an
//! [`store::EventStore`] and summarizes the result. The `PostGIS` store binds
//! every value through `query_raw_params()`; user input never reaches the SQL
//! text.

pub mod db;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod query;
pub mod search;
pub mod spatial;
pub mod store;

pub use search::{SearchResults, execute, search, search_fields};

use seismo_map_database_models::ValidationError;

/// Errors raised by the event store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The store could not be reached.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of what went wrong.
        message: String,
    },

    /// A returned row could not be decoded.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// Reference data the query depends on is absent.
    #[error("Missing data: {message}")]
    MissingData {
        /// Description of what is missing.
        message: String,
    },
}

/// Errors from an end-to-end search: validating the raw input, then querying
/// the store.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The raw criteria were rejected before any query ran.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The store failed while running the queries.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! Lookups against the virtual catalog never fail; these errors describe
//! talking to the live database through an [`Executor`](crate::Executor).

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during Catalog operations
#[derive(Debug, Error, Clone, Serialize)]
pub enum CatalogError {
    /// Failed to connect to the database
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Query execution timed out
    #[error("Query timed out after {0}s")]
    QueryTimeout(u64),

    /// Requested table was not found
    #[error("Table '{0}' not found in schema '{1}'")]
    TableNotFound(String, String),

    /// `SHOW CREATE TABLE` output could not be lowered
    #[error("Invalid definition of table '{0}': {1}")]
    InvalidDefinition(String, String),

    /// Invalid adapter configuration
    #[error("Invalid catalog configuration: {0}")]
    ConfigurationError(String),

    /// The specified feature is not supported by this adapter
    #[error("Feature not supported: {0}")]
    NotSupported(String),
}

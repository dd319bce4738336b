// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for review and commit
//!
//! Rule violations are never errors; they land in
//! [`InspectResults`](crate::InspectResults). These types cover the cases
//! where a review or an execution cannot continue at all.

use serde::Serialize;
use sqlreview_catalog::CatalogError;
use thiserror::Error;

/// Result type alias for advisor operations
pub type AdvisorResult<T> = Result<T, AdvisorError>;

/// Errors that abort a review or an execution
#[derive(Debug, Error, Clone, Serialize)]
pub enum AdvisorError {
    /// The live database could not be consulted
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The requested action is not allowed in the task's current state
    #[error(transparent)]
    Action(#[from] ActionError),

    /// A rule named in the configuration is not registered
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    /// A statement failed while committing or rolling back
    #[error("Statement {number} failed: {message}")]
    Execution { number: usize, message: String },
}

/// Task state does not allow the requested action
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionError {
    #[error("task has committed")]
    Committed,

    #[error("task has rolled back")]
    RolledBack,

    #[error("task has not been committed")]
    NotCommitted,
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Rollback generation errors

use serde::Serialize;
use sqlreview_catalog::CatalogError;
use thiserror::Error;

pub type RollbackResult<T> = Result<T, RollbackError>;

/// Failures that abort rollback generation
///
/// Conditions that only make a statement unsafe to roll back (row cap
/// exceeded, missing primary key, multi-table DML) are not errors; they
/// yield no rollback for that statement.
#[derive(Debug, Error, Clone, Serialize)]
pub enum RollbackError {
    /// The live database could not be consulted
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The matching-row count query returned something unexpected
    #[error("do not match records for select count(*): {0}")]
    RecordCount(String),
}

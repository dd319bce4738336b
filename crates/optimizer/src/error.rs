// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Index advice errors

use serde::Serialize;
use sqlreview_catalog::CatalogError;
use thiserror::Error;

pub type OptimizerResult<T> = Result<T, OptimizerError>;

#[derive(Debug, Error, Clone, Serialize)]
pub enum OptimizerError {
    /// Plan, row count or cardinality could not be fetched
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The execution plan names a table the statement does not reference
    #[error("table {0} not found when optimizing index")]
    TableNotFound(String),

    #[error("unexpected cardinality result for column {0}")]
    Cardinality(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OptimizerError::TableNotFound("t1".to_string());
        assert_eq!(err.to_string(), "table t1 not found when optimizing index");

        let err = OptimizerError::from(CatalogError::ConnectionFailed("refused".to_string()));
        assert_eq!(err.to_string(), "Failed to connect to database: refused");
    }
}

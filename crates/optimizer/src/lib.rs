// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Review - Index Optimizer
//!
//! Index advice for SELECT statements, driven by the live execution plan.
//!
//! ## Architecture
//!
//! - [`SelectTables`]: which tables a SELECT reads and how (sole table of a
//!   select, or joined on a column).
//! - [`candidate_columns`]: three-star ordering of a single-table select's
//!   predicate and projection columns.
//! - [`Optimizer`]: plan-driven advice over a catalog
//!   [`Session`](sqlreview_catalog::Session).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqlreview_optimizer::{Optimizer, OptimizerConfig};
//!
//! let mut optimizer = Optimizer::new(&mut session, OptimizerConfig::default());
//! let advice = optimizer.optimize(&select).await?;
//! ```

pub mod candidates;
pub mod error;
pub mod optimizer;
pub mod tables;

pub use candidates::candidate_columns;
pub use error::{OptimizerError, OptimizerResult};
pub use optimizer::{
    DEFAULT_CARDINALITY_MAX_ROWS, DEFAULT_COMPOSITE_INDEX_MAX_COLUMNS, OptimizeResult, Optimizer,
    OptimizerConfig, need_optimize, remove_driving_tables,
};
pub use tables::{SelectTables, TableEntry, TableUsage};

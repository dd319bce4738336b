// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Review - Rollback
//!
//! Derives compensating statements for a reviewed task before it runs.
//!
//! ## Architecture
//!
//! - [`generate_rollback`]: walks the task against a catalog
//!   [`Session`](sqlreview_catalog::Session) and returns the rollback list,
//!   last statement first.
//! - [`ddl`]: structural inverses of schema changes, including
//!   [`invert_alter`] for ALTER TABLE.
//! - [`dml`]: row-level inverses of INSERT, UPDATE and DELETE, bounded by
//!   [`RollbackConfig::dml_rollback_max_rows`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqlreview_rollback::{RollbackConfig, generate_rollback};
//!
//! let rollbacks = generate_rollback(&mut session, &task, &RollbackConfig::default()).await?;
//! task.rollback_sqls = rollbacks;
//! ```

pub mod ddl;
pub mod dml;
pub mod error;
pub mod generator;

pub use ddl::invert_alter;
pub use error::{RollbackError, RollbackResult};
pub use generator::{
    DEFAULT_DML_ROLLBACK_MAX_ROWS, RollbackConfig, generate_rollback, rollback_statement,
};

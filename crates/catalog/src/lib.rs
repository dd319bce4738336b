// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Review - Catalog Layer
//!
//! This crate holds the virtual schema state the review engine checks
//! statements against, and the execution adapter it reaches the live
//! database through.
//!
//! ## Architecture
//!
//! - [`Catalog`]: schemas and tables as they will look after every statement
//!   reviewed so far. Forking is cheap; table definitions are shared.
//! - [`TableInfo`]: one table's fetched definition, its pending ALTERs and the
//!   merged result of both.
//! - [`Executor`]: the narrow live-database interface (schema listing,
//!   `SHOW CREATE TABLE`, queries, `EXPLAIN`).
//! - [`Connection`]: one pinned session for commit and rollback runs
//!   (statements, transactions, binlog position).
//! - [`Session`]: a catalog paired with an executor; populates the catalog
//!   lazily, at most once per schema list, table list and definition.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqlreview_catalog::{Catalog, LiveMySqlExecutor, Session};
//! use std::sync::Arc;
//!
//! let executor = Arc::new(LiveMySqlExecutor::new("mysql://root@localhost:3306").await?);
//! let mut session = Session::new(executor, Catalog::new("app"));
//! let name = sqlreview_ir::ObjectName::new("users");
//! if session.is_table_exist(&name).await? {
//!     let table = session.create_table_of(&name).await?;
//! }
//! ```
//!
//! ## Implementing the Executor Trait
//!
//! ```rust,ignore
//! use sqlreview_catalog::{Executor, CatalogResult, ExecResult, Row};
//! use async_trait::async_trait;
//!
//! struct MyExecutor;
//!
//! #[async_trait]
//! impl Executor for MyExecutor {
//!     async fn show_databases(&self) -> CatalogResult<Vec<String>> {
//!         // Your implementation here
//!     }
//!     // ...
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod executor;
pub mod live_mysql;
pub mod session;
pub mod table;

// Re-exports
pub use catalog::{Catalog, SchemaInfo};
pub use error::{CatalogError, CatalogResult};
pub use executor::{BinlogPosition, Connection, ExecResult, Executor, ExplainRecord, Row, row_value};
pub use live_mysql::LiveMySqlExecutor;
pub use session::Session;
pub use table::{TableInfo, merge_alter};

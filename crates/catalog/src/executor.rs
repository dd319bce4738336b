// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Execution adapter
//!
//! The narrow interface the review engine uses to reach a live database:
//! seeding the catalog, fetching rows for DML rollback, committing
//! statements and fetching execution plans.
//!
//! Every call may fail with a connectivity error. Implementations never
//! retry; retry policy belongs to the caller.

use crate::error::{CatalogError, CatalogResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlreview_ir::ObjectName;
use std::collections::BTreeMap;

/// One result row keyed by column label; `None` is SQL NULL
pub type Row = BTreeMap<String, Option<String>>;

/// Outcome of a statement that does not return rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResult {
    pub rows_affected: u64,
}

/// Binlog coordinates captured around DML execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinlogPosition {
    pub file: String,
    pub position: i64,
}

/// One row of `EXPLAIN` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainRecord {
    /// SELECT id; rows sharing an id form one join group
    pub id: String,
    pub table: String,
    /// Access type (`ALL`, `index`, `ref`, ...)
    pub access_type: String,
}

impl ExplainRecord {
    pub fn new(id: impl Into<String>, table: impl Into<String>, access_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            table: table.into(),
            access_type: access_type.into(),
        }
    }
}

/// Read a column from a row, treating NULL and absence alike
pub fn row_value<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column)
        .or_else(|| {
            row.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(column))
                .map(|(_, v)| v)
        })
        .and_then(|v| v.as_deref())
}

/// Execution adapter over a live connection
///
/// # Examples
///
/// ```rust,ignore
/// use sqlreview_catalog::Executor;
///
/// async fn schemas(executor: &dyn Executor) -> CatalogResult<usize> {
///     executor.ping().await?;
///     Ok(executor.show_databases().await?.len())
/// }
/// ```
#[async_trait]
pub trait Executor: Send + Sync {
    /// Check the connection is usable
    async fn ping(&self) -> CatalogResult<()>;

    /// `SHOW DATABASES`
    async fn show_databases(&self) -> CatalogResult<Vec<String>>;

    /// `SHOW CREATE TABLE`; the returned text is the table definition
    async fn show_create_table(&self, table: &ObjectName) -> CatalogResult<String>;

    /// `SHOW TABLES FROM schema`
    async fn show_tables(&self, schema: &str) -> CatalogResult<Vec<String>>;

    /// Run a query; `args` bind to `?` placeholders in order
    async fn query(&self, sql: &str, args: &[String]) -> CatalogResult<Vec<Row>>;

    /// Hold one connection for a run of statements that share session state
    /// (`USE`, transactions)
    async fn acquire(&self) -> CatalogResult<Box<dyn Connection + '_>>;

    /// `EXPLAIN` of a query
    async fn explain(&self, sql: &str) -> CatalogResult<Vec<ExplainRecord>> {
        let rows = self.query(&format!("EXPLAIN {}", sql), &[]).await?;
        Ok(rows
            .iter()
            .map(|row| {
                ExplainRecord::new(
                    row_value(row, "id").unwrap_or_default(),
                    row_value(row, "table").unwrap_or_default(),
                    row_value(row, "type").unwrap_or_default(),
                )
            })
            .collect())
    }
}

/// A single connection pinned for a commit or rollback run
///
/// Statements run in order on the same session, so a `USE` carries over to
/// the statements after it.
#[async_trait]
pub trait Connection: Send {
    /// Run a statement that returns no rows
    async fn exec(&mut self, sql: &str) -> CatalogResult<ExecResult>;

    /// Run a query on this session
    async fn query(&mut self, sql: &str) -> CatalogResult<Vec<Row>>;

    /// Run `sqls` in one transaction, returning the summed rows affected
    async fn transact(&mut self, sqls: &[String]) -> CatalogResult<ExecResult>;

    /// Current binlog file and offset; `("", 0)` when binary logging is off
    async fn fetch_binlog_position(&mut self) -> CatalogResult<BinlogPosition> {
        let rows = self.query("show master status").await?;
        binlog_position(&rows)
    }
}

fn binlog_position(rows: &[Row]) -> CatalogResult<BinlogPosition> {
    let Some(row) = rows.first() else {
        return Ok(BinlogPosition::default());
    };
    let file = row_value(row, "File").unwrap_or_default().to_string();
    let position = match row_value(row, "Position") {
        Some(pos) => pos
            .parse()
            .map_err(|_| CatalogError::QueryFailed(format!("invalid binlog position '{}'", pos)))?,
        None => 0,
    };
    Ok(BinlogPosition { file, position })
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock execution adapter for testing
//!
//! Provides a scripted in-memory database with builder pattern for easy test
//! setup. Every call is recorded so tests can assert how often the catalog
//! went to the database.

use async_trait::async_trait;
use sqlreview_catalog::{
    BinlogPosition, CatalogError, CatalogResult, Connection, ExecResult, Executor, ExplainRecord,
    Row,
};
use sqlreview_ir::ObjectName;
use std::collections::HashMap;
use std::sync::Mutex;

/// Build a result row from `(column, value)` pairs
pub fn row(cells: &[(&str, Option<&str>)]) -> Row {
    cells
        .iter()
        .map(|(column, value)| (column.to_string(), value.map(str::to_string)))
        .collect()
}

#[derive(Debug, Clone)]
struct MockTable {
    name: String,
    create_sql: String,
    rows: u64,
}

/// In-memory execution adapter for testing
#[derive(Debug, Default)]
pub struct MockExecutor {
    databases: Vec<String>,
    /// Lower-cased schema name to its tables
    tables: HashMap<String, Vec<MockTable>>,
    /// Query text (whitespace-collapsed) to its result rows
    queries: HashMap<String, Vec<Row>>,
    explains: HashMap<String, Vec<ExplainRecord>>,
    /// SQL fragment to the error message of any statement containing it
    failures: Vec<(String, String)>,
    unreachable: bool,
    binlog: Option<BinlogPosition>,
    rows_affected: u64,
    calls: Mutex<Vec<String>>,
    executed: Mutex<Vec<String>>,
}

impl MockExecutor {
    /// Create a new empty mock executor
    pub fn new() -> Self {
        Self {
            rows_affected: 1,
            ..Default::default()
        }
    }

    pub fn builder() -> MockExecutorBuilder {
        MockExecutorBuilder::new()
    }

    /// Every call made so far, as the SQL (or `SHOW ...` text) it stands for
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of calls whose text starts with `prefix` (case-insensitive)
    pub fn call_count(&self, prefix: &str) -> usize {
        let prefix = prefix.to_lowercase();
        self.calls()
            .iter()
            .filter(|call| call.to_lowercase().starts_with(&prefix))
            .count()
    }

    /// Number of pinned connections handed out
    pub fn connections(&self) -> usize {
        self.call_count("ACQUIRE")
    }

    /// Statements that were successfully executed or committed
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call.into());
    }

    fn check(&self, sql: &str) -> CatalogResult<()> {
        if self.unreachable {
            return Err(CatalogError::ConnectionFailed(
                "dial tcp 127.0.0.1:3306: connect: connection refused".to_string(),
            ));
        }
        let lowered = sql.to_lowercase();
        match self
            .failures
            .iter()
            .find(|(fragment, _)| lowered.contains(fragment.as_str()))
        {
            Some((_, message)) => Err(CatalogError::QueryFailed(message.clone())),
            None => Ok(()),
        }
    }

    fn find_table(&self, schema: &str, name: &str) -> Option<&MockTable> {
        self.tables
            .get(&schema.to_lowercase())?
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    fn table_status(&self, sql: &str) -> Vec<Row> {
        let schema = between(sql, "FROM `", "`");
        let pattern = between(sql, "LIKE '", "'");
        let (Some(schema), Some(pattern)) = (schema, pattern) else {
            return Vec::new();
        };
        self.find_table(schema, pattern)
            .map(|t| {
                let rows = t.rows.to_string();
                vec![row(&[
                    ("Name", Some(t.name.as_str())),
                    ("Engine", Some("InnoDB")),
                    ("Rows", Some(rows.as_str())),
                ])]
            })
            .unwrap_or_default()
    }
}

fn between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let len = text[from..].find(end)?;
    Some(&text[from..from + len])
}

fn normalize(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl Executor for MockExecutor {
    async fn ping(&self) -> CatalogResult<()> {
        self.record("PING");
        self.check("")
    }

    async fn show_databases(&self) -> CatalogResult<Vec<String>> {
        self.record("SHOW DATABASES");
        self.check("show databases")?;
        Ok(self.databases.clone())
    }

    async fn show_create_table(&self, table: &ObjectName) -> CatalogResult<String> {
        let sql = format!("SHOW CREATE TABLE {}", table);
        self.record(sql.clone());
        self.check(&sql)?;
        let schema = table.schema.clone().unwrap_or_default();
        self.find_table(&schema, &table.name)
            .map(|t| t.create_sql.clone())
            .ok_or_else(|| CatalogError::TableNotFound(table.name.clone(), schema))
    }

    async fn show_tables(&self, schema: &str) -> CatalogResult<Vec<String>> {
        let sql = format!("SHOW TABLES FROM `{}`", schema);
        self.record(sql.clone());
        self.check(&sql)?;
        if !self.databases.iter().any(|db| db.eq_ignore_ascii_case(schema)) {
            return Err(CatalogError::QueryFailed(format!(
                "Unknown database '{}'",
                schema
            )));
        }
        Ok(self
            .tables
            .get(&schema.to_lowercase())
            .map(|tables| tables.iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default())
    }

    async fn query(&self, sql: &str, _args: &[String]) -> CatalogResult<Vec<Row>> {
        self.record(sql);
        self.check(sql)?;
        let normalized = normalize(sql);
        if normalized.eq_ignore_ascii_case("show master status") {
            return Ok(self
                .binlog
                .iter()
                .map(|pos| {
                    let position = pos.position.to_string();
                    row(&[
                        ("File", Some(pos.file.as_str())),
                        ("Position", Some(position.as_str())),
                    ])
                })
                .collect());
        }
        if let Some(inner) = normalized.strip_prefix("EXPLAIN ") {
            return Ok(self
                .explains
                .get(inner)
                .map(|plan| {
                    plan.iter()
                        .map(|r| {
                            row(&[
                                ("id", Some(r.id.as_str())),
                                ("table", Some(r.table.as_str())),
                                ("type", Some(r.access_type.as_str())),
                            ])
                        })
                        .collect()
                })
                .unwrap_or_default());
        }
        if normalized.starts_with("SHOW TABLE STATUS") {
            return Ok(self.table_status(&normalized));
        }
        Ok(self.queries.get(&normalized).cloned().unwrap_or_default())
    }

    async fn acquire(&self) -> CatalogResult<Box<dyn Connection + '_>> {
        self.record("ACQUIRE");
        self.check("")?;
        Ok(Box::new(MockConnection { executor: self }))
    }
}

/// Pinned connection over the scripted database; calls are recorded on the
/// executor that handed it out
struct MockConnection<'a> {
    executor: &'a MockExecutor,
}

#[async_trait]
impl Connection for MockConnection<'_> {
    async fn exec(&mut self, sql: &str) -> CatalogResult<ExecResult> {
        let executor = self.executor;
        executor.record(sql);
        executor.check(sql)?;
        executor
            .executed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(sql.to_string());
        Ok(ExecResult {
            rows_affected: executor.rows_affected,
        })
    }

    async fn query(&mut self, sql: &str) -> CatalogResult<Vec<Row>> {
        self.executor.query(sql, &[]).await
    }

    async fn transact(&mut self, sqls: &[String]) -> CatalogResult<ExecResult> {
        let executor = self.executor;
        executor.record("BEGIN");
        for sql in sqls {
            executor.record(sql.clone());
            if let Err(e) = executor.check(sql) {
                executor.record("ROLLBACK");
                return Err(e);
            }
        }
        executor.record("COMMIT");
        executor
            .executed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(sqls.iter().cloned());
        Ok(ExecResult {
            rows_affected: executor.rows_affected * sqls.len() as u64,
        })
    }
}

/// Builder for creating mock executors with a fluent API
pub struct MockExecutorBuilder {
    executor: MockExecutor,
}

impl Default for MockExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            executor: MockExecutor::new(),
        }
    }

    /// Add an (initially empty) database
    pub fn with_database(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.executor.databases.contains(&name) {
            self.executor.databases.push(name);
        }
        self
    }

    /// Add a table; `create_sql` is what `SHOW CREATE TABLE` returns
    pub fn with_table(
        mut self,
        schema: &str,
        name: impl Into<String>,
        create_sql: impl Into<String>,
    ) -> Self {
        self = self.with_database(schema);
        self.executor
            .tables
            .entry(schema.to_lowercase())
            .or_default()
            .push(MockTable {
                name: name.into(),
                create_sql: create_sql.into(),
                rows: 0,
            });
        self
    }

    /// Set the row count `SHOW TABLE STATUS` reports for a table
    pub fn with_row_count(mut self, schema: &str, name: &str, rows: u64) -> Self {
        if let Some(table) = self
            .executor
            .tables
            .get_mut(&schema.to_lowercase())
            .and_then(|tables| tables.iter_mut().find(|t| t.name.eq_ignore_ascii_case(name)))
        {
            table.rows = rows;
        }
        self
    }

    /// Script the result of a query
    pub fn with_query(mut self, sql: &str, rows: Vec<Row>) -> Self {
        self.executor.queries.insert(normalize(sql), rows);
        self
    }

    /// Script the `EXPLAIN` output of a query
    pub fn with_explain(mut self, sql: &str, plan: Vec<ExplainRecord>) -> Self {
        self.executor.explains.insert(normalize(sql), plan);
        self
    }

    /// Fail every statement containing `fragment` (case-insensitive)
    pub fn with_failure(mut self, fragment: &str, message: impl Into<String>) -> Self {
        self.executor
            .failures
            .push((fragment.to_lowercase(), message.into()));
        self
    }

    pub fn with_binlog(mut self, file: impl Into<String>, position: i64) -> Self {
        self.executor.binlog = Some(BinlogPosition {
            file: file.into(),
            position,
        });
        self
    }

    /// Rows affected reported per executed statement
    pub fn with_rows_affected(mut self, rows: u64) -> Self {
        self.executor.rows_affected = rows;
        self
    }

    /// Fail every call with a connection error
    pub fn unreachable(mut self) -> Self {
        self.executor.unreachable = true;
        self
    }

    pub fn build(self) -> MockExecutor {
        self.executor
    }
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Index optimizer
//!
//! Turns the execution plan of a SELECT into index advice:
//!
//! 1. collect the tables the statement reads ([`SelectTables`])
//! 2. `EXPLAIN` the statement through the session (cached per text)
//! 3. drop the driving table of every join group
//! 4. keep tables scanned with access type `ALL` or `index`
//! 5. advise the join column for driven tables, or the three-star
//!    candidates for single-table selects
//!
//! Single-table advice is capped at
//! [`OptimizerConfig::composite_index_max_columns`], skipped when an existing
//! index already starts with the same columns, and reordered by descending
//! cardinality when the table is small enough to count.

use crate::candidates::candidate_columns;
use crate::error::{OptimizerError, OptimizerResult};
use crate::tables::{SelectTables, TableUsage};
use serde::{Deserialize, Serialize};
use sqlreview_catalog::{ExplainRecord, Session, row_value};
use sqlreview_ir::{
    ConstraintKind, CreateIndex, CreateTable, IndexColumn, IndexOptions, ObjectName,
    SelectStatement, quote_ident,
};
use std::cmp::Reverse;
use tracing::{debug, info};

/// Default cap on the columns of one advised index
pub const DEFAULT_COMPOSITE_INDEX_MAX_COLUMNS: usize = 3;

/// Tables with at least this many rows are not sampled for cardinality
pub const DEFAULT_CARDINALITY_MAX_ROWS: u64 = 1_000_000;

const ACCESS_TYPE_ALL: &str = "ALL";
const ACCESS_TYPE_INDEX: &str = "index";
const THREE_STAR_REASON: &str = "三星索引建议";

/// Index advice tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub composite_index_max_columns: usize,
    pub cardinality_max_rows: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            composite_index_max_columns: DEFAULT_COMPOSITE_INDEX_MAX_COLUMNS,
            cardinality_max_rows: DEFAULT_CARDINALITY_MAX_ROWS,
        }
    }
}

impl OptimizerConfig {
    pub fn with_composite_index_max_columns(mut self, columns: usize) -> Self {
        self.composite_index_max_columns = columns;
        self
    }

    pub fn with_cardinality_max_rows(mut self, rows: u64) -> Self {
        self.cardinality_max_rows = rows;
        self
    }
}

/// One advised index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeResult {
    /// Table to index, qualified with its schema
    pub table: ObjectName,
    pub indexed_columns: Vec<String>,
    /// Why the index is advised
    pub reason: String,
}

impl OptimizeResult {
    /// `idx_<table>_<col>_<col>`
    pub fn index_name(&self) -> String {
        format!("idx_{}_{}", self.table.name, self.indexed_columns.join("_"))
    }

    /// Statement creating the advised index
    pub fn create_index_sql(&self) -> String {
        CreateIndex {
            name: self.index_name(),
            table: self.table.clone(),
            kind: ConstraintKind::Index,
            keys: self.indexed_columns.iter().map(IndexColumn::new).collect(),
            options: IndexOptions::default(),
        }
        .to_string()
    }
}

/// Index advisor over a catalog session
///
/// # Examples
///
/// ```rust,ignore
/// let mut optimizer = Optimizer::new(&mut session, OptimizerConfig::default());
/// for advice in optimizer.optimize(&select).await? {
///     println!("{} -- {}", advice.create_index_sql(), advice.reason);
/// }
/// ```
pub struct Optimizer<'s> {
    session: &'s mut Session,
    config: OptimizerConfig,
}

impl<'s> Optimizer<'s> {
    pub fn new(session: &'s mut Session, config: OptimizerConfig) -> Self {
        Self { session, config }
    }

    /// Advise indexes for `select`, one result per table worth indexing
    ///
    /// # Errors
    ///
    /// Fails when the plan, a row count or a cardinality cannot be fetched,
    /// or when the plan names a table the statement does not reference.
    pub async fn optimize(
        &mut self,
        select: &SelectStatement,
    ) -> OptimizerResult<Vec<OptimizeResult>> {
        let tables = SelectTables::collect(select);
        if tables.is_empty() {
            debug!("no table to optimize");
            return Ok(Vec::new());
        }

        let plan = self.session.explain(&select.to_string()).await?;
        let candidates: Vec<ExplainRecord> = remove_driving_tables(plan)
            .into_iter()
            .filter(need_optimize)
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        info!(
            tables = ?candidates.iter().map(|r| r.table.as_str()).collect::<Vec<_>>(),
            "need optimize tables"
        );

        let mut results = Vec::new();
        for record in &candidates {
            if is_derived(&record.table) {
                continue;
            }
            let entry = tables
                .get(&record.table)
                .ok_or_else(|| OptimizerError::TableNotFound(record.table.clone()))?;
            let table = self.session.catalog().resolve(&entry.name);
            let result = match &entry.usage {
                TableUsage::JoinOn(column) => Some(OptimizeResult {
                    reason: format!("字段 {} 为被驱动表 {} 上的关联字段", column, record.table),
                    table,
                    indexed_columns: vec![column.clone()],
                }),
                TableUsage::Single(select) => self.optimize_single_table(table, select).await?,
            };
            results.extend(result);
        }
        Ok(results)
    }

    async fn optimize_single_table(
        &mut self,
        table: ObjectName,
        select: &SelectStatement,
    ) -> OptimizerResult<Option<OptimizeResult>> {
        let mut columns = candidate_columns(select);
        columns.truncate(self.config.composite_index_max_columns);
        if columns.is_empty() {
            return Ok(None);
        }
        if let Some(definition) = self.session.create_table_of(&table).await? {
            if is_covered(&definition, &columns) {
                debug!(table = %table, ?columns, "columns already indexed");
                return Ok(None);
            }
        }
        info!(table = %table, ?columns, reason = THREE_STAR_REASON, "general optimize result");

        if columns.len() > 1 {
            let rows = self.session.table_row_count(&table).await?;
            if rows < self.config.cardinality_max_rows {
                columns = self.sort_by_cardinality(&table, columns).await?;
            } else {
                debug!(table = %table, rows, "table too large to sample cardinality");
            }
        }
        Ok(Some(OptimizeResult {
            table,
            indexed_columns: columns,
            reason: THREE_STAR_REASON.to_string(),
        }))
    }

    /// Most selective column first; ties keep their order
    async fn sort_by_cardinality(
        &self,
        table: &ObjectName,
        columns: Vec<String>,
    ) -> OptimizerResult<Vec<String>> {
        let mut ranked = Vec::with_capacity(columns.len());
        for column in columns {
            let sql = format!(
                "SELECT COUNT(DISTINCT {}) AS cardinality FROM {}",
                quote_ident(&column),
                table
            );
            let rows = self.session.executor().query(&sql, &[]).await?;
            let cardinality = rows
                .first()
                .and_then(|row| row_value(row, "cardinality"))
                .and_then(|value| value.parse::<u64>().ok())
                .ok_or_else(|| OptimizerError::Cardinality(column.clone()))?;
            ranked.push((column, cardinality));
        }
        ranked.sort_by_key(|(_, cardinality)| Reverse(*cardinality));
        Ok(ranked.into_iter().map(|(column, _)| column).collect())
    }
}

/// Drop the first (driving) row of every multi-row join group
///
/// Rows sharing an `id` belong to one SELECT; a group of one is a
/// single-table select and is kept.
pub fn remove_driving_tables(records: Vec<ExplainRecord>) -> Vec<ExplainRecord> {
    let mut result = Vec::with_capacity(records.len());
    let mut records = records.into_iter().peekable();
    while let Some(leader) = records.next() {
        let mut driven = false;
        while let Some(next) = records.next_if(|r| r.id == leader.id) {
            driven = true;
            result.push(next);
        }
        if !driven {
            result.push(leader);
        }
    }
    result
}

/// Full table scan or full index scan
pub fn need_optimize(record: &ExplainRecord) -> bool {
    record.access_type == ACCESS_TYPE_ALL || record.access_type == ACCESS_TYPE_INDEX
}

/// `<derivedN>`, `<subqueryN>` and `<unionM,N>` plan rows
fn is_derived(table: &str) -> bool {
    table.is_empty() || table.starts_with('<')
}

/// Whether an existing index starts with exactly `columns`, in order
fn is_covered(table: &CreateTable, columns: &[String]) -> bool {
    let starts_with = |keys: &[String]| {
        keys.len() >= columns.len()
            && keys
                .iter()
                .zip(columns)
                .all(|(key, column)| key.eq_ignore_ascii_case(column))
    };
    if table.primary_key().is_some_and(|pk| starts_with(&pk)) {
        return true;
    }
    table
        .constraints
        .iter()
        .filter(|c| {
            matches!(
                c.kind,
                ConstraintKind::PrimaryKey | ConstraintKind::Index | ConstraintKind::Unique
            )
        })
        .any(|c| {
            let keys: Vec<String> = c.keys.iter().map(|k| k.column.clone()).collect();
            starts_with(&keys)
        })
}

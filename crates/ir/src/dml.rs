// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Data manipulation statements: INSERT/REPLACE, UPDATE and DELETE.

use crate::expr::{ColumnRef, Expr, write_list};
use crate::name::{ObjectName, display_ident};
use crate::query::{Limit, OrderBy, SelectStatement, TableRef, write_order_limit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `column = value` in SET lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub column: ColumnRef,
    pub value: Expr,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.column, self.value)
    }
}

/// Row source of an INSERT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InsertSource {
    /// `VALUES (..), (..)`
    Values(Vec<Vec<Expr>>),
    /// `SET c = v, ...`
    Set(Vec<Assignment>),
    /// `INSERT ... SELECT`
    Select(Box<SelectStatement>),
}

/// INSERT or REPLACE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub replace: bool,
    pub ignore: bool,
    pub table: ObjectName,
    pub columns: Vec<String>,
    pub source: InsertSource,
    pub on_duplicate: Vec<Assignment>,
}

impl Insert {
    /// Number of rows the statement inserts literally; `None` for INSERT ... SELECT
    pub fn row_count(&self) -> Option<usize> {
        match &self.source {
            InsertSource::Values(rows) => Some(rows.len()),
            InsertSource::Set(_) => Some(1),
            InsertSource::Select(_) => None,
        }
    }
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.replace { "REPLACE" } else { "INSERT" })?;
        if self.ignore {
            write!(f, " IGNORE")?;
        }
        write!(f, " INTO {}", self.table)?;
        if !self.columns.is_empty() {
            let cols: Vec<String> = self.columns.iter().map(|c| display_ident(c)).collect();
            write!(f, " ({})", cols.join(", "))?;
        }
        match &self.source {
            InsertSource::Values(rows) => {
                write!(f, " VALUES ")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "(")?;
                    write_list(f, row, ", ")?;
                    write!(f, ")")?;
                }
            }
            InsertSource::Set(assignments) => {
                write!(f, " SET ")?;
                write_list(f, assignments, ", ")?;
            }
            InsertSource::Select(select) => write!(f, " {}", select)?,
        }
        if !self.on_duplicate.is_empty() {
            write!(f, " ON DUPLICATE KEY UPDATE ")?;
            write_list(f, &self.on_duplicate, ", ")?;
        }
        Ok(())
    }
}

/// UPDATE, single or multi-table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub tables: Vec<TableRef>,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expr>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<Limit>,
}

impl Update {
    pub fn target_tables(&self) -> Vec<(&ObjectName, Option<&str>)> {
        self.tables.iter().flat_map(|t| t.tables()).collect()
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE ")?;
        write_list(f, &self.tables, ", ")?;
        write!(f, " SET ")?;
        write_list(f, &self.assignments, ", ")?;
        if let Some(expr) = &self.where_clause {
            write!(f, " WHERE {}", expr)?;
        }
        write_order_limit(f, &self.order_by, self.limit.as_ref())
    }
}

/// DELETE, single or multi-table
///
/// For `DELETE FROM t ...` `targets` is empty and `from` holds `t`; for the
/// multi-table form `DELETE t1, t2 FROM ...` the deleted tables are listed in
/// `targets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delete {
    pub targets: Vec<ObjectName>,
    pub from: Vec<TableRef>,
    pub where_clause: Option<Expr>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<Limit>,
}

impl Delete {
    pub fn is_multi_table(&self) -> bool {
        !self.targets.is_empty() || self.from.len() > 1 || self.from.iter().any(|t| !t.joins.is_empty())
    }

    pub fn source_tables(&self) -> Vec<(&ObjectName, Option<&str>)> {
        self.from.iter().flat_map(|t| t.tables()).collect()
    }
}

impl fmt::Display for Delete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE ")?;
        if !self.targets.is_empty() {
            write_list(f, &self.targets, ", ")?;
            write!(f, " ")?;
        }
        write!(f, "FROM ")?;
        write_list(f, &self.from, ", ")?;
        if let Some(expr) = &self.where_clause {
            write!(f, " WHERE {}", expr)?;
        }
        write_order_limit(f, &self.order_by, self.limit.as_ref())
    }
}

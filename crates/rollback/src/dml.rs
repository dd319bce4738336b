// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # DML rollback
//!
//! INSERT is undone by deleting the inserted primary keys. UPDATE and DELETE
//! are undone from the rows they will touch, fetched from the live database
//! before the forward statement runs and bounded by the row cap:
//!
//! ```text
//! limit = LIMIT of the statement, else cap + 1
//! limit > cap  ->  SELECT count(*) ...; more than cap rows means no rollback
//! SELECT * FROM t WHERE .. ORDER BY .. LIMIT limit
//! ```
//!
//! Multi-table statements, tables without a primary key and
//! `ON DUPLICATE KEY UPDATE` get no rollback.

use crate::error::{RollbackError, RollbackResult};
use sqlreview_catalog::{Row, Session, row_value};
use sqlreview_ir::{
    Assignment, CreateTable, Delete, Expr, Insert, InsertSource, Literal, ObjectName, OrderBy,
    Update, quote_ident,
};
use std::sync::Arc;
use tracing::debug;

/// `DELETE` per inserted row, pinned on its primary key
pub async fn insert(
    session: &mut Session,
    stmt: &Insert,
    max_rows: i64,
) -> RollbackResult<Option<String>> {
    if !stmt.on_duplicate.is_empty() {
        debug!(table = %stmt.table, "insert with on duplicate key update is not rolled back");
        return Ok(None);
    }
    let Some((table, pk)) = table_with_pk(session, &stmt.table).await? else {
        return Ok(None);
    };
    let target = session.catalog().resolve(&stmt.table);

    let rows: Vec<Vec<(&str, &Expr)>> = match &stmt.source {
        InsertSource::Values(values) => {
            if values.len() as i64 > max_rows {
                debug!(table = %target, rows = values.len(), "too many rows to roll back");
                return Ok(None);
            }
            let columns: Vec<&str> = if stmt.columns.is_empty() {
                table.column_names()
            } else {
                stmt.columns.iter().map(String::as_str).collect()
            };
            let mut rows = Vec::with_capacity(values.len());
            for value in values {
                if value.len() != columns.len() {
                    return Ok(None);
                }
                rows.push(columns.iter().copied().zip(value.iter()).collect());
            }
            rows
        }
        InsertSource::Set(assignments) => {
            if max_rows < 1 {
                return Ok(None);
            }
            vec![assignment_pairs(assignments)]
        }
        InsertSource::Select(_) => return Ok(None),
    };

    let mut rollback = String::new();
    for row in rows {
        let filter: Vec<String> = row
            .iter()
            .filter(|(name, _)| is_pk(&pk, name))
            .map(|(name, value)| {
                format!(
                    "{} = {}",
                    quote_ident(name),
                    Literal::String(value.value_text())
                )
            })
            .collect();
        if filter.len() != pk.len() {
            return Ok(None);
        }
        rollback.push_str(&format!(
            "DELETE FROM {} WHERE {};\n",
            target,
            filter.join(" AND ")
        ));
    }
    Ok((!rollback.is_empty()).then_some(rollback))
}

/// One `INSERT` restoring every deleted row
pub async fn delete(
    session: &mut Session,
    stmt: &Delete,
    max_rows: i64,
) -> RollbackResult<Option<String>> {
    if stmt.is_multi_table() {
        return Ok(None);
    }
    let Some(&(name, alias)) = stmt.source_tables().first() else {
        return Ok(None);
    };
    let Some((table, _)) = table_with_pk(session, name).await? else {
        return Ok(None);
    };
    let source = RecordSource {
        table: session.catalog().resolve(name),
        alias,
        where_clause: stmt.where_clause.as_ref(),
        order_by: &stmt.order_by,
        limit: stmt.limit.map(|l| l.count),
    };
    let Some(records) = source.fetch(session, max_rows).await? else {
        return Ok(None);
    };

    let columns = table.column_names();
    let mut values = Vec::with_capacity(records.len());
    for record in &records {
        if record.len() != columns.len() {
            return Ok(None);
        }
        let row: Vec<String> = columns.iter().map(|c| cell(record, c)).collect();
        values.push(format!("({})", row.join(", ")));
    }
    if values.is_empty() {
        return Ok(None);
    }
    let columns: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    Ok(Some(format!(
        "INSERT INTO {} ({}) VALUES {};",
        source.table,
        columns.join(", "),
        values.join(", ")
    )))
}

/// One `UPDATE` per touched row, restoring the assigned columns
///
/// The WHERE clause pins the row's primary key as it is after the forward
/// statement. A key column assigned anything but a literal has no known new
/// value, so such statements get no rollback.
pub async fn update(
    session: &mut Session,
    stmt: &Update,
    max_rows: i64,
) -> RollbackResult<Option<String>> {
    let targets = stmt.target_tables();
    let [(name, alias)] = targets.as_slice() else {
        return Ok(None);
    };
    let Some((table, pk)) = table_with_pk(session, name).await? else {
        return Ok(None);
    };

    let assignment = |column: &str| {
        stmt.assignments
            .iter()
            .rev()
            .find(|a| a.column.column.eq_ignore_ascii_case(column))
            .map(|a| &a.value)
    };
    let mut new_keys = Vec::new();
    for key in &pk {
        match assignment(key) {
            None => {}
            Some(value) if is_literal(value) => {
                new_keys.push((key.as_str(), Literal::String(value.value_text()).to_string()));
            }
            Some(value) => {
                debug!(table = %name, column = %key, value = %value, "primary key assigned a non-literal value");
                return Ok(None);
            }
        }
    }

    let source = RecordSource {
        table: session.catalog().resolve(name),
        alias: *alias,
        where_clause: stmt.where_clause.as_ref(),
        order_by: &stmt.order_by,
        limit: stmt.limit.map(|l| l.count),
    };
    let Some(records) = source.fetch(session, max_rows).await? else {
        return Ok(None);
    };

    let mut rollback = String::new();
    for record in &records {
        if record.len() != table.columns.len() {
            return Ok(None);
        }
        let mut set = Vec::new();
        let mut filter = Vec::new();
        for column in &table.columns {
            let value = cell(record, &column.name);
            let quoted = quote_ident(&column.name);
            if !is_pk(&pk, &column.name) {
                if assignment(&column.name).is_some() {
                    set.push(format!("{} = {}", quoted, value));
                }
                continue;
            }
            let new_key = new_keys
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(&column.name));
            match new_key {
                Some((_, new_value)) => {
                    set.push(format!("{} = {}", quoted, value));
                    filter.push(format!("{} = {}", quoted, new_value));
                }
                None => filter.push(format!("{} = {}", quoted, value)),
            }
        }
        rollback.push_str(&format!(
            "UPDATE {} SET {} WHERE {};\n",
            source.table,
            set.join(", "),
            filter.join(" AND ")
        ));
    }
    Ok((!rollback.is_empty()).then_some(rollback))
}

/// Definition and primary key of an existing table
async fn table_with_pk(
    session: &mut Session,
    name: &ObjectName,
) -> RollbackResult<Option<(Arc<CreateTable>, Vec<String>)>> {
    let Some(table) = session.create_table_of(name).await? else {
        return Ok(None);
    };
    match table.primary_key() {
        Some(pk) if !pk.is_empty() => Ok(Some((table, pk))),
        _ => {
            debug!(table = %name, "table without primary key is not rolled back");
            Ok(None)
        }
    }
}

fn assignment_pairs(assignments: &[Assignment]) -> Vec<(&str, &Expr)> {
    assignments
        .iter()
        .map(|a| (a.column.column.as_str(), &a.value))
        .collect()
}

fn is_literal(value: &Expr) -> bool {
    matches!(
        value.unparen(),
        Expr::Literal(Literal::String(_) | Literal::Number(_))
    )
}

fn is_pk(pk: &[String], column: &str) -> bool {
    pk.iter().any(|k| k.eq_ignore_ascii_case(column))
}

/// A fetched value as a SQL literal
fn cell(record: &Row, column: &str) -> String {
    match row_value(record, column) {
        Some(value) => Literal::String(value.to_string()).to_string(),
        None => Literal::Null.to_string(),
    }
}

/// The rows an UPDATE or DELETE will touch
struct RecordSource<'a> {
    table: ObjectName,
    alias: Option<&'a str>,
    where_clause: Option<&'a Expr>,
    order_by: &'a [OrderBy],
    limit: Option<u64>,
}

impl RecordSource<'_> {
    /// Fetch the rows, or `None` when more than `max_rows` match or the
    /// statement touches none (`LIMIT 0`)
    async fn fetch(&self, session: &Session, max_rows: i64) -> RollbackResult<Option<Vec<Row>>> {
        if self.limit == Some(0) {
            return Ok(None);
        }
        let cap = max_rows.max(0) as u64;
        let limit = self.limit.unwrap_or(cap + 1);
        let executor = session.executor();
        if limit > cap {
            let rows = executor
                .query(&self.select("count(*) as count", limit), &[])
                .await?;
            let count = match rows.as_slice() {
                [row] => row_value(row, "count").and_then(|c| c.parse::<u64>().ok()),
                _ => None,
            }
            .ok_or_else(|| RollbackError::RecordCount(format!("{} rows", rows.len())))?;
            if count > cap {
                debug!(table = %self.table, count, cap, "too many rows to roll back");
                return Ok(None);
            }
        }
        Ok(Some(executor.query(&self.select("*", limit), &[]).await?))
    }

    fn select(&self, projection: &str, limit: u64) -> String {
        let mut sql = format!("SELECT {} FROM {}", projection, self.table);
        if let Some(alias) = self.alias {
            sql.push_str(&format!(" AS {}", quote_ident(alias)));
        }
        if let Some(expr) = self.where_clause {
            sql.push_str(&format!(" WHERE {}", expr));
        }
        if !self.order_by.is_empty() {
            let items: Vec<String> = self.order_by.iter().map(|o| o.to_string()).collect();
            sql.push_str(&format!(" ORDER BY {}", items.join(", ")));
        }
        sql.push_str(&format!(" LIMIT {}", limit));
        sql
    }
}

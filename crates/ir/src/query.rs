// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query Representation
//!
//! This module represents SELECT statements and the table-reference trees
//! shared with UPDATE and DELETE.
//!
//! ## SELECT Statement
//!
//! [`SelectStatement`] contains:
//!
//! - **Projection**: SELECT clause with columns/expressions
//! - **FROM**: Table sources with joins
//! - **WHERE**: Row filtering condition
//! - **GROUP BY** / **HAVING**: Aggregation
//! - **ORDER BY** / **LIMIT**: Sorting and row cap
//!
//! ## Table References and Joins
//!
//! The FROM clause is a list of [`TableRef`]s; each comma-separated item is
//! one entry and carries the chain of explicit joins that follow it:
//!
//! ```sql
//! -- one TableRef with one Join
//! FROM users u INNER JOIN orders o ON u.id = o.user_id
//!
//! -- two TableRefs (comma join)
//! FROM users u, orders o
//!
//! -- USING clause
//! FROM users u JOIN orders o USING (user_id)
//! ```

use crate::expr::{Expr, write_list};
use crate::name::{ObjectName, display_ident};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SELECT statement
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectStatement {
    /// SELECT DISTINCT or ALL
    pub distinct: bool,

    /// Projection list (columns to select)
    pub projection: Vec<SelectItem>,

    /// FROM clause
    pub from: Vec<TableRef>,

    /// WHERE clause
    pub where_clause: Option<Expr>,

    /// GROUP BY clause
    pub group_by: Vec<Expr>,

    /// HAVING clause
    pub having: Option<Expr>,

    /// ORDER BY clause
    pub order_by: Vec<OrderBy>,

    /// LIMIT clause
    pub limit: Option<Limit>,
}

impl SelectStatement {
    /// Whether the projection contains an unqualified or qualified wildcard
    pub fn selects_all(&self) -> bool {
        self.projection
            .iter()
            .any(|item| matches!(item, SelectItem::Wildcard | SelectItem::QualifiedWildcard(_)))
    }

    /// Every named table in the FROM clause, including joined tables,
    /// in source order
    pub fn tables(&self) -> Vec<(&ObjectName, Option<&str>)> {
        self.from.iter().flat_map(|t| t.tables()).collect()
    }

    /// Subqueries reachable from this statement (derived tables, WHERE,
    /// projection), not including the statement itself
    pub fn subqueries(&self) -> Vec<&SelectStatement> {
        let mut out = Vec::new();
        for table_ref in &self.from {
            for factor in table_ref.factors() {
                if let TableFactor::Derived { subquery, .. } = factor {
                    out.push(subquery.as_ref());
                }
            }
            for join in &table_ref.joins {
                if let JoinCondition::On(expr) = &join.condition {
                    out.extend(expr.subqueries());
                }
            }
        }
        for item in &self.projection {
            if let SelectItem::UnnamedExpr(expr) | SelectItem::AliasedExpr { expr, .. } = item {
                out.extend(expr.subqueries());
            }
        }
        if let Some(expr) = &self.where_clause {
            out.extend(expr.subqueries());
        }
        if let Some(expr) = &self.having {
            out.extend(expr.subqueries());
        }
        out
    }
}

/// Item in a SELECT projection list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectItem {
    /// Unnamed expression (e.g., `column` or `a + b`)
    UnnamedExpr(Expr),

    /// Expression with alias (e.g., `col AS name`)
    AliasedExpr { expr: Expr, alias: String },

    /// Qualified wildcard (e.g., `table.*`)
    QualifiedWildcard(String),

    /// Unqualified wildcard (`*`)
    Wildcard,
}

/// A single relation in a FROM clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableFactor {
    /// Named table
    Table {
        name: ObjectName,
        alias: Option<String>,
    },

    /// Derived table (`(SELECT ...) AS alias`)
    Derived {
        subquery: Box<SelectStatement>,
        alias: Option<String>,
    },
}

impl TableFactor {
    pub fn table(name: ObjectName) -> Self {
        TableFactor::Table { name, alias: None }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            TableFactor::Table { alias, .. } | TableFactor::Derived { alias, .. } => {
                alias.as_deref()
            }
        }
    }
}

/// Table reference in FROM clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    /// Leading relation
    pub relation: TableFactor,

    /// Joins
    pub joins: Vec<Join>,
}

impl TableRef {
    pub fn new(relation: TableFactor) -> Self {
        Self {
            relation,
            joins: Vec::new(),
        }
    }

    /// Leading relation followed by every joined relation
    pub fn factors(&self) -> impl Iterator<Item = &TableFactor> {
        std::iter::once(&self.relation).chain(self.joins.iter().map(|j| &j.relation))
    }

    /// Named tables with their aliases
    pub fn tables(&self) -> Vec<(&ObjectName, Option<&str>)> {
        self.factors()
            .filter_map(|factor| match factor {
                TableFactor::Table { name, alias } => Some((name, alias.as_deref())),
                TableFactor::Derived { .. } => None,
            })
            .collect()
    }
}

/// JOIN clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    /// Join type
    pub join_type: JoinType,

    /// Table to join
    pub relation: TableFactor,

    /// Join condition (ON or USING)
    pub condition: JoinCondition,
}

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Cross,
}

/// Join condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinCondition {
    On(Expr),
    Using(Vec<String>),
    Natural,
    None,
}

/// ORDER BY item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub expr: Expr,
    pub direction: Option<SortDirection>,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// `LIMIT [offset,] count`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    pub count: u64,
    pub offset: Option<u64>,
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        write_list(f, &self.projection, ", ")?;
        if !self.from.is_empty() {
            write!(f, " FROM ")?;
            write_list(f, &self.from, ", ")?;
        }
        if let Some(expr) = &self.where_clause {
            write!(f, " WHERE {}", expr)?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY ")?;
            write_list(f, &self.group_by, ", ")?;
        }
        if let Some(expr) = &self.having {
            write!(f, " HAVING {}", expr)?;
        }
        write_order_limit(f, &self.order_by, self.limit.as_ref())
    }
}

pub(crate) fn write_order_limit(
    f: &mut fmt::Formatter<'_>,
    order_by: &[OrderBy],
    limit: Option<&Limit>,
) -> fmt::Result {
    if !order_by.is_empty() {
        write!(f, " ORDER BY ")?;
        write_list(f, order_by, ", ")?;
    }
    if let Some(limit) = limit {
        write!(f, " {}", limit)?;
    }
    Ok(())
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::UnnamedExpr(expr) => write!(f, "{}", expr),
            SelectItem::AliasedExpr { expr, alias } => {
                write!(f, "{} AS {}", expr, display_ident(alias))
            }
            SelectItem::QualifiedWildcard(table) => write!(f, "{}.*", display_ident(table)),
            SelectItem::Wildcard => write!(f, "*"),
        }
    }
}

impl fmt::Display for TableFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFactor::Table { name, alias } => {
                write!(f, "{}", name)?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", display_ident(alias))?;
                }
                Ok(())
            }
            TableFactor::Derived { subquery, alias } => {
                write!(f, "({})", subquery)?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", display_ident(alias))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relation)?;
        for join in &self.joins {
            let keyword = match join.join_type {
                JoinType::Inner => "JOIN",
                JoinType::Left => "LEFT JOIN",
                JoinType::Right => "RIGHT JOIN",
                JoinType::Cross => "CROSS JOIN",
            };
            match &join.condition {
                JoinCondition::Natural => write!(f, " NATURAL {} {}", keyword, join.relation)?,
                _ => write!(f, " {} {}", keyword, join.relation)?,
            }
            match &join.condition {
                JoinCondition::On(expr) => write!(f, " ON {}", expr)?,
                JoinCondition::Using(cols) => {
                    let cols: Vec<String> = cols.iter().map(|c| display_ident(c)).collect();
                    write!(f, " USING ({})", cols.join(", "))?
                }
                JoinCondition::Natural | JoinCondition::None => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        match self.direction {
            Some(SortDirection::Asc) => write!(f, " ASC"),
            Some(SortDirection::Desc) => write!(f, " DESC"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "LIMIT {}, {}", offset, self.count),
            None => write!(f, "LIMIT {}", self.count),
        }
    }
}

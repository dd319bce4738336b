// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Table extraction
//!
//! Finds every table a SELECT reads, keyed the way `EXPLAIN` names it (alias
//! if present, table name otherwise), across the statement and all of its
//! subqueries:
//!
//! ```text
//! SELECT * FROM t1 AS a WHERE ..             a  -> Single(the SELECT)
//! SELECT * FROM t1 JOIN t2 ON t1.x = t2.y    t1 -> JoinOn(x), t2 -> JoinOn(y)
//! SELECT * FROM t1 JOIN t2 USING (x)         t1 -> JoinOn(x), t2 -> JoinOn(x)
//! ```
//!
//! Comma joins, cross joins and joins without a condition contribute nothing.

use sqlreview_ir::{
    BinaryOp, Expr, JoinCondition, ObjectName, SelectStatement, TableFactor, TableRef,
};
use std::collections::HashMap;

/// How a table takes part in the statement
#[derive(Debug, Clone, PartialEq)]
pub enum TableUsage<'a> {
    /// Only table of this SELECT
    Single(&'a SelectStatement),
    /// Joined on this column
    JoinOn(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry<'a> {
    pub name: ObjectName,
    pub usage: TableUsage<'a>,
}

/// Tables of a SELECT tree by lowercase alias or name
#[derive(Debug, Default)]
pub struct SelectTables<'a> {
    entries: HashMap<String, TableEntry<'a>>,
}

impl<'a> SelectTables<'a> {
    pub fn collect(select: &'a SelectStatement) -> Self {
        let mut tables = Self::default();
        tables.visit(select);
        tables
    }

    pub fn get(&self, key: &str) -> Option<&TableEntry<'a>> {
        self.entries.get(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn visit(&mut self, select: &'a SelectStatement) {
        match select.from.as_slice() {
            [] => {}
            [single] if single.joins.is_empty() => {
                if let TableFactor::Table { name, alias } = &single.relation {
                    let key = alias.as_deref().unwrap_or(&name.name);
                    self.insert(key, name, TableUsage::Single(select));
                }
            }
            from => {
                let names = factor_names(select);
                for table_ref in from {
                    self.visit_joins(table_ref, &names);
                }
            }
        }
        for subquery in select.subqueries() {
            self.visit(subquery);
        }
    }

    fn visit_joins(&mut self, table_ref: &'a TableRef, names: &HashMap<String, &'a ObjectName>) {
        for join in &table_ref.joins {
            match &join.condition {
                JoinCondition::On(expr) => {
                    for term in expr.conjuncts() {
                        let Expr::BinaryOp {
                            left,
                            op: BinaryOp::Eq,
                            right,
                        } = term.unparen()
                        else {
                            continue;
                        };
                        let (Expr::Column(l), Expr::Column(r)) = (left.unparen(), right.unparen())
                        else {
                            continue;
                        };
                        for column in [l, r] {
                            let Some(qualifier) = &column.table else {
                                continue;
                            };
                            if let Some(name) = names.get(&qualifier.to_lowercase()) {
                                self.insert(qualifier, name, TableUsage::JoinOn(column.column.clone()));
                            }
                        }
                    }
                }
                JoinCondition::Using(columns) => {
                    let Some(column) = columns.first() else {
                        continue;
                    };
                    for factor in [&table_ref.relation, &join.relation] {
                        if let TableFactor::Table { name, alias } = factor {
                            let key = alias.as_deref().unwrap_or(&name.name);
                            self.insert(key, name, TableUsage::JoinOn(column.clone()));
                        }
                    }
                }
                JoinCondition::Natural | JoinCondition::None => {}
            }
        }
    }

    fn insert(&mut self, key: &str, name: &ObjectName, usage: TableUsage<'a>) {
        self.entries.insert(
            key.to_lowercase(),
            TableEntry {
                name: name.clone(),
                usage,
            },
        );
    }
}

/// Named tables of one SELECT by lowercase alias or name
fn factor_names(select: &SelectStatement) -> HashMap<String, &ObjectName> {
    select
        .tables()
        .into_iter()
        .map(|(name, alias)| (alias.unwrap_or(&name.name).to_lowercase(), name))
        .collect()
}

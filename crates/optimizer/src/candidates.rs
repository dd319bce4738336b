// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Three-star index candidates
//!
//! Orders the columns of a single-table SELECT the way a three-star index
//! wants them:
//!
//! ```text
//! star 1   equality predicates (=, <=>, IN, IS)   in WHERE order
//! star 2   ORDER BY columns
//! star 3   range predicates, then projection      only when the projection
//!                                                 has no wildcard
//! ```
//!
//! A predicate counts only when one side is a bare column and the other side
//! is constant. Each column appears once, at its first position.

use sqlreview_ir::{BinaryOp, ColumnRef, Expr, SelectItem, SelectStatement};

/// Candidate index columns of `select`, best first
pub fn candidate_columns(select: &SelectStatement) -> Vec<String> {
    let mut columns = Columns::default();
    let terms: Vec<&Expr> = select
        .where_clause
        .as_ref()
        .map(|expr| expr.conjuncts())
        .unwrap_or_default();

    for term in &terms {
        if let Some(column) = equality_column(term) {
            columns.push(column);
        }
    }
    for order in &select.order_by {
        if let Expr::Column(column) = order.expr.unparen() {
            columns.push(column);
        }
    }
    if !select.selects_all() {
        for term in &terms {
            if let Some(column) = range_column(term) {
                columns.push(column);
            }
        }
        for item in &select.projection {
            if let SelectItem::UnnamedExpr(expr) | SelectItem::AliasedExpr { expr, .. } = item {
                for column in expr.columns() {
                    columns.push(column);
                }
            }
        }
    }
    columns.0
}

#[derive(Default)]
struct Columns(Vec<String>);

impl Columns {
    fn push(&mut self, column: &ColumnRef) {
        if !self.0.iter().any(|c| c.eq_ignore_ascii_case(&column.column)) {
            self.0.push(column.column.clone());
        }
    }
}

fn equality_column(term: &Expr) -> Option<&ColumnRef> {
    match term.unparen() {
        Expr::BinaryOp {
            left,
            op: BinaryOp::Eq | BinaryOp::NullSafeEq | BinaryOp::In | BinaryOp::Is,
            right,
        } => column_against_constant(left, right),
        _ => None,
    }
}

fn range_column(term: &Expr) -> Option<&ColumnRef> {
    match term.unparen() {
        Expr::BinaryOp { left, op, right } if op.is_range() => column_against_constant(left, right),
        Expr::Between { expr, low, high, .. } if is_constant(low) && is_constant(high) => {
            match expr.unparen() {
                Expr::Column(column) => Some(column),
                _ => None,
            }
        }
        _ => None,
    }
}

fn column_against_constant<'a>(left: &'a Expr, right: &'a Expr) -> Option<&'a ColumnRef> {
    match (left.unparen(), right.unparen()) {
        (Expr::Column(column), other) | (other, Expr::Column(column)) if is_constant(other) => {
            Some(column)
        }
        _ => None,
    }
}

fn is_constant(expr: &Expr) -> bool {
    expr.columns().is_empty() && expr.subqueries().is_empty()
}

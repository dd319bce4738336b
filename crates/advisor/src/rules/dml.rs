// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! DML rules

use crate::rule::Verdict;
use sqlreview_catalog::Catalog;
use sqlreview_ir::{Expr, Statement};

/// Whether a WHERE condition actually restricts rows
///
/// `1 = 1` and `id = id` do not; any column comparison or subquery does.
fn is_meaningful(expr: &Expr) -> bool {
    match expr.unparen() {
        Expr::BinaryOp { left, right, .. } => {
            if let (Expr::Column(l), Expr::Column(r)) = (left.unparen(), right.unparen()) {
                if l == r {
                    return false;
                }
            }
            is_meaningful(left) || is_meaningful(right)
        }
        Expr::Column(_) => true,
        other => !other.columns().is_empty() || !other.subqueries().is_empty(),
    }
}

fn where_is_invalid(where_clause: Option<&Expr>) -> bool {
    !where_clause.is_some_and(is_meaningful)
}

pub fn check_where_is_invalid(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(match statement {
        Statement::Select(select) if !select.from.is_empty() => {
            where_is_invalid(select.where_clause.as_ref())
        }
        Statement::Update(update) => where_is_invalid(update.where_clause.as_ref()),
        Statement::Delete(delete) => where_is_invalid(delete.where_clause.as_ref()),
        _ => false,
    })
}

pub fn disable_select_all_column(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(matches!(statement, Statement::Select(select) if select.selects_all()))
}

pub fn check_with_limit(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(match statement {
        Statement::Update(update) => update.limit.is_some(),
        Statement::Delete(delete) => delete.limit.is_some(),
        _ => false,
    })
}

pub fn check_with_order_by(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(match statement {
        Statement::Update(update) => !update.order_by.is_empty(),
        Statement::Delete(delete) => !delete.order_by.is_empty(),
        _ => false,
    })
}

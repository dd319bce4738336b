// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SELECT lowering and the table-reference shapes shared with UPDATE/DELETE

use crate::error::{LoweringError, LoweringResult};
use crate::expr::{lower_expr, lower_exprs, lower_object_name};
use sqlparser::ast;
use sqlreview_ir::{
    Join, JoinCondition, JoinType, Limit, OrderBy, SelectItem, SelectStatement, SortDirection,
    TableFactor, TableRef,
};

pub(crate) fn lower_query(query: &ast::Query) -> LoweringResult<SelectStatement> {
    if query.with.is_some() {
        return Err(LoweringError::unsupported("WITH"));
    }
    if query.fetch.is_some() || query.for_clause.is_some() || !query.limit_by.is_empty() {
        return Err(LoweringError::unsupported("FETCH/FOR clause"));
    }
    let mut select = match query.body.as_ref() {
        ast::SetExpr::Select(select) => lower_select(select)?,
        ast::SetExpr::Query(inner) => lower_query(inner)?,
        ast::SetExpr::SetOperation { op, .. } => {
            return Err(LoweringError::unsupported(op.to_string().to_uppercase()));
        }
        other => return Err(LoweringError::unsupported(format!("query body {}", other))),
    };
    if !query.order_by.is_empty() {
        select.order_by = lower_order_by(&query.order_by)?;
    }
    if let Some(limit) = lower_limit(query.limit.as_ref(), query.offset.as_ref().map(|o| &o.value))? {
        select.limit = Some(limit);
    }
    Ok(select)
}

fn lower_select(select: &ast::Select) -> LoweringResult<SelectStatement> {
    if select.top.is_some() || select.into.is_some() || !select.named_window.is_empty() {
        return Err(LoweringError::unsupported("SELECT TOP/INTO/WINDOW"));
    }
    let distinct = match &select.distinct {
        None => false,
        Some(ast::Distinct::Distinct) => true,
        Some(ast::Distinct::On(_)) => return Err(LoweringError::unsupported("DISTINCT ON")),
    };
    let group_by = match &select.group_by {
        ast::GroupByExpr::Expressions(exprs) => lower_exprs(exprs)?,
        ast::GroupByExpr::All => return Err(LoweringError::unsupported("GROUP BY ALL")),
    };
    let from = if is_dual(&select.from) {
        Vec::new()
    } else {
        lower_table_refs(&select.from)?
    };
    Ok(SelectStatement {
        distinct,
        projection: select
            .projection
            .iter()
            .map(lower_select_item)
            .collect::<LoweringResult<_>>()?,
        from,
        where_clause: select.selection.as_ref().map(lower_expr).transpose()?,
        group_by,
        having: select.having.as_ref().map(lower_expr).transpose()?,
        order_by: Vec::new(),
        limit: None,
    })
}

/// `FROM DUAL`
fn is_dual(from: &[ast::TableWithJoins]) -> bool {
    matches!(from, [ast::TableWithJoins { relation: ast::TableFactor::Table { name, alias: None, .. }, joins }]
        if joins.is_empty() && name.0.len() == 1 && name.0[0].value.eq_ignore_ascii_case("DUAL"))
}

fn lower_select_item(item: &ast::SelectItem) -> LoweringResult<SelectItem> {
    match item {
        ast::SelectItem::UnnamedExpr(expr) => Ok(SelectItem::UnnamedExpr(lower_expr(expr)?)),
        ast::SelectItem::ExprWithAlias { expr, alias } => Ok(SelectItem::AliasedExpr {
            expr: lower_expr(expr)?,
            alias: alias.value.clone(),
        }),
        ast::SelectItem::QualifiedWildcard(name, _) => Ok(SelectItem::QualifiedWildcard(
            name.0.last().map(|i| i.value.clone()).unwrap_or_default(),
        )),
        ast::SelectItem::Wildcard(_) => Ok(SelectItem::Wildcard),
    }
}

pub(crate) fn lower_table_refs(tables: &[ast::TableWithJoins]) -> LoweringResult<Vec<TableRef>> {
    tables.iter().map(lower_table_ref).collect()
}

fn lower_table_ref(table: &ast::TableWithJoins) -> LoweringResult<TableRef> {
    let mut table_ref = TableRef::new(lower_table_factor(&table.relation)?);
    for join in &table.joins {
        let (join_type, constraint) = match &join.join_operator {
            ast::JoinOperator::Inner(c) => (JoinType::Inner, Some(c)),
            ast::JoinOperator::LeftOuter(c) => (JoinType::Left, Some(c)),
            ast::JoinOperator::RightOuter(c) => (JoinType::Right, Some(c)),
            ast::JoinOperator::CrossJoin => (JoinType::Cross, None),
            other => return Err(LoweringError::unsupported(format!("join {:?}", other))),
        };
        let condition = match constraint {
            Some(ast::JoinConstraint::On(expr)) => JoinCondition::On(lower_expr(expr)?),
            Some(ast::JoinConstraint::Using(idents)) => {
                JoinCondition::Using(idents.iter().map(|i| i.value.clone()).collect())
            }
            Some(ast::JoinConstraint::Natural) => JoinCondition::Natural,
            Some(ast::JoinConstraint::None) | None => JoinCondition::None,
        };
        table_ref.joins.push(Join {
            join_type,
            relation: lower_table_factor(&join.relation)?,
            condition,
        });
    }
    Ok(table_ref)
}

fn lower_table_factor(factor: &ast::TableFactor) -> LoweringResult<TableFactor> {
    match factor {
        ast::TableFactor::Table {
            name, alias, args, ..
        } => {
            if args.is_some() {
                return Err(LoweringError::unsupported("table function"));
            }
            Ok(TableFactor::Table {
                name: lower_object_name(name)?,
                alias: lower_alias(alias.as_ref())?,
            })
        }
        ast::TableFactor::Derived {
            lateral: false,
            subquery,
            alias,
        } => Ok(TableFactor::Derived {
            subquery: Box::new(lower_query(subquery)?),
            alias: lower_alias(alias.as_ref())?,
        }),
        ast::TableFactor::NestedJoin { .. } => Err(LoweringError::unsupported("parenthesized join")),
        other => Err(LoweringError::unsupported(format!("table reference {}", other))),
    }
}

fn lower_alias(alias: Option<&ast::TableAlias>) -> LoweringResult<Option<String>> {
    match alias {
        Some(alias) if !alias.columns.is_empty() => {
            Err(LoweringError::unsupported("derived column list"))
        }
        Some(alias) => Ok(Some(alias.name.value.clone())),
        None => Ok(None),
    }
}

pub(crate) fn lower_order_by(order_by: &[ast::OrderByExpr]) -> LoweringResult<Vec<OrderBy>> {
    order_by
        .iter()
        .map(|o| {
            Ok(OrderBy {
                expr: lower_expr(&o.expr)?,
                direction: o.asc.map(|asc| {
                    if asc {
                        SortDirection::Asc
                    } else {
                        SortDirection::Desc
                    }
                }),
            })
        })
        .collect()
}

/// `LIMIT count [OFFSET offset]`; both must be unsigned integer literals
pub(crate) fn lower_limit(
    count: Option<&ast::Expr>,
    offset: Option<&ast::Expr>,
) -> LoweringResult<Option<Limit>> {
    let Some(count) = count else {
        if offset.is_some() {
            return Err(LoweringError::unsupported("OFFSET without LIMIT"));
        }
        return Ok(None);
    };
    Ok(Some(Limit {
        count: literal_u64(count)?,
        offset: offset.map(literal_u64).transpose()?,
    }))
}

fn literal_u64(expr: &ast::Expr) -> LoweringResult<u64> {
    match expr {
        ast::Expr::Value(ast::Value::Number(n, _)) => {
            n.to_string()
                .parse()
                .map_err(|_| LoweringError::InvalidLiteral {
                    value: n.to_string(),
                    type_name: "unsigned integer".to_string(),
                })
        }
        other => Err(LoweringError::InvalidLiteral {
            value: other.to_string(),
            type_name: "unsigned integer".to_string(),
        }),
    }
}

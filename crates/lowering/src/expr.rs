// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Expression lowering from the `sqlparser` AST
//!
//! MySQL spellings collapse onto one IR form: `||` is `OR`, `DIV` is `/`,
//! `IS TRUE` is `IS` against a boolean literal, and a negated number literal
//! keeps its sign in the literal text.

use crate::error::{LoweringError, LoweringResult};
use crate::query::lower_query;
use sqlparser::ast;
use sqlreview_ir::{BinaryOp, ColumnRef, Expr, Literal, ObjectName, UnaryOp};

pub(crate) fn lower_expr(expr: &ast::Expr) -> LoweringResult<Expr> {
    match expr {
        ast::Expr::Identifier(ident) => {
            if ident.quote_style.is_none() && ident.value.eq_ignore_ascii_case("DEFAULT") {
                return Ok(Expr::Default);
            }
            lower_column(std::slice::from_ref(ident)).map(Expr::Column)
        }
        ast::Expr::CompoundIdentifier(idents) => lower_column(idents).map(Expr::Column),
        ast::Expr::Value(value) => lower_value(value).map(Expr::Literal),
        ast::Expr::IntroducedString { value, .. } => lower_value(value).map(Expr::Literal),
        ast::Expr::Nested(inner) => Ok(Expr::Paren(Box::new(lower_expr(inner)?))),
        ast::Expr::Tuple(items) => Ok(Expr::List(lower_exprs(items)?)),
        ast::Expr::BinaryOp { left, op, right } => Ok(Expr::binary(
            lower_expr(left)?,
            lower_binary_op(op)?,
            lower_expr(right)?,
        )),
        ast::Expr::UnaryOp { op, expr } => lower_unary(op, expr),
        ast::Expr::IsNull(e) => is(e, BinaryOp::Is, Literal::Null),
        ast::Expr::IsNotNull(e) => is(e, BinaryOp::IsNot, Literal::Null),
        ast::Expr::IsTrue(e) => is(e, BinaryOp::Is, Literal::Boolean(true)),
        ast::Expr::IsNotTrue(e) => is(e, BinaryOp::IsNot, Literal::Boolean(true)),
        ast::Expr::IsFalse(e) => is(e, BinaryOp::Is, Literal::Boolean(false)),
        ast::Expr::IsNotFalse(e) => is(e, BinaryOp::IsNot, Literal::Boolean(false)),
        ast::Expr::IsUnknown(e) => is(e, BinaryOp::Is, Literal::Null),
        ast::Expr::IsNotUnknown(e) => is(e, BinaryOp::IsNot, Literal::Null),
        ast::Expr::InList {
            expr,
            list,
            negated,
        } => Ok(Expr::binary(
            lower_expr(expr)?,
            if *negated { BinaryOp::NotIn } else { BinaryOp::In },
            Expr::List(lower_exprs(list)?),
        )),
        ast::Expr::InSubquery {
            expr,
            subquery,
            negated,
        } => Ok(Expr::binary(
            lower_expr(expr)?,
            if *negated { BinaryOp::NotIn } else { BinaryOp::In },
            Expr::Subquery(Box::new(lower_query(subquery)?)),
        )),
        ast::Expr::Between {
            expr,
            negated,
            low,
            high,
        } => Ok(Expr::Between {
            expr: Box::new(lower_expr(expr)?),
            negated: *negated,
            low: Box::new(lower_expr(low)?),
            high: Box::new(lower_expr(high)?),
        }),
        ast::Expr::Like {
            negated,
            expr,
            pattern,
            escape_char: None,
        } => Ok(Expr::binary(
            lower_expr(expr)?,
            if *negated { BinaryOp::NotLike } else { BinaryOp::Like },
            lower_expr(pattern)?,
        )),
        ast::Expr::Function(function) => lower_function(function),
        ast::Expr::Case {
            operand,
            conditions,
            results,
            else_result,
        } => Ok(Expr::Case {
            operand: operand
                .as_deref()
                .map(lower_expr)
                .transpose()?
                .map(Box::new),
            conditions: lower_exprs(conditions)?,
            results: lower_exprs(results)?,
            else_result: else_result
                .as_deref()
                .map(lower_expr)
                .transpose()?
                .map(Box::new),
        }),
        ast::Expr::Exists { subquery, negated } => {
            let exists = Expr::UnaryOp {
                op: UnaryOp::Exists,
                expr: Box::new(Expr::Subquery(Box::new(lower_query(subquery)?))),
            };
            Ok(if *negated {
                Expr::UnaryOp {
                    op: UnaryOp::Not,
                    expr: Box::new(exists),
                }
            } else {
                exists
            })
        }
        ast::Expr::Subquery(query) => Ok(Expr::Subquery(Box::new(lower_query(query)?))),
        ast::Expr::Wildcard => Ok(Expr::Wildcard),
        ast::Expr::Ceil { expr, field } if *field == ast::DateTimeField::NoDateTime => {
            single_arg_function("CEIL", expr)
        }
        ast::Expr::Floor { expr, field } if *field == ast::DateTimeField::NoDateTime => {
            single_arg_function("FLOOR", expr)
        }
        ast::Expr::Interval(_) => Err(LoweringError::unsupported("INTERVAL expression")),
        other => Err(LoweringError::unsupported(format!("expression '{}'", other))),
    }
}

fn single_arg_function(name: &str, arg: &ast::Expr) -> LoweringResult<Expr> {
    Ok(Expr::Function {
        name: name.to_string(),
        args: vec![lower_expr(arg)?],
        distinct: false,
    })
}

pub(crate) fn lower_exprs(exprs: &[ast::Expr]) -> LoweringResult<Vec<Expr>> {
    exprs.iter().map(lower_expr).collect()
}

fn is(expr: &ast::Expr, op: BinaryOp, literal: Literal) -> LoweringResult<Expr> {
    Ok(Expr::binary(lower_expr(expr)?, op, Expr::Literal(literal)))
}

fn lower_unary(op: &ast::UnaryOperator, expr: &ast::Expr) -> LoweringResult<Expr> {
    match op {
        ast::UnaryOperator::Plus => lower_expr(expr),
        ast::UnaryOperator::Minus => Ok(match lower_expr(expr)? {
            Expr::Literal(Literal::Number(n)) => Expr::number(format!("-{}", n)),
            other => Expr::UnaryOp {
                op: UnaryOp::Neg,
                expr: Box::new(other),
            },
        }),
        ast::UnaryOperator::Not => Ok(Expr::UnaryOp {
            op: UnaryOp::Not,
            expr: Box::new(lower_expr(expr)?),
        }),
        other => Err(LoweringError::unsupported(format!("operator {}", other))),
    }
}

fn lower_binary_op(op: &ast::BinaryOperator) -> LoweringResult<BinaryOp> {
    Ok(match op {
        ast::BinaryOperator::Plus => BinaryOp::Add,
        ast::BinaryOperator::Minus => BinaryOp::Sub,
        ast::BinaryOperator::Multiply => BinaryOp::Mul,
        ast::BinaryOperator::Divide | ast::BinaryOperator::MyIntegerDivide => BinaryOp::Div,
        ast::BinaryOperator::Modulo => BinaryOp::Mod,
        ast::BinaryOperator::Eq => BinaryOp::Eq,
        ast::BinaryOperator::Spaceship => BinaryOp::NullSafeEq,
        ast::BinaryOperator::NotEq => BinaryOp::NotEq,
        ast::BinaryOperator::Lt => BinaryOp::Lt,
        ast::BinaryOperator::LtEq => BinaryOp::LtEq,
        ast::BinaryOperator::Gt => BinaryOp::Gt,
        ast::BinaryOperator::GtEq => BinaryOp::GtEq,
        ast::BinaryOperator::And => BinaryOp::And,
        ast::BinaryOperator::Or | ast::BinaryOperator::StringConcat => BinaryOp::Or,
        ast::BinaryOperator::Xor => BinaryOp::Xor,
        other => return Err(LoweringError::unsupported(format!("operator {}", other))),
    })
}

fn lower_value(value: &ast::Value) -> LoweringResult<Literal> {
    match value {
        ast::Value::Null => Ok(Literal::Null),
        ast::Value::Boolean(b) => Ok(Literal::Boolean(*b)),
        ast::Value::Number(n, _) => Ok(Literal::Number(n.to_string())),
        ast::Value::SingleQuotedString(s)
        | ast::Value::DoubleQuotedString(s)
        | ast::Value::NationalStringLiteral(s) => Ok(Literal::String(s.clone())),
        ast::Value::HexStringLiteral(s) => Ok(Literal::Number(format!("X'{}'", s))),
        ast::Value::SingleQuotedByteStringLiteral(s) => Ok(Literal::Number(format!("b'{}'", s))),
        ast::Value::Placeholder(p) => Err(LoweringError::unsupported(format!("placeholder '{}'", p))),
        other => Err(LoweringError::unsupported(format!("literal {}", other))),
    }
}

fn lower_function(function: &ast::Function) -> LoweringResult<Expr> {
    if function.over.is_some() || function.filter.is_some() || !function.order_by.is_empty() {
        return Err(LoweringError::unsupported(format!(
            "window or ordered aggregate {}",
            function.name
        )));
    }
    let name = function
        .name
        .0
        .iter()
        .map(|i| i.value.as_str())
        .collect::<Vec<_>>()
        .join(".");
    let args = function
        .args
        .iter()
        .map(|arg| match arg {
            ast::FunctionArg::Unnamed(ast::FunctionArgExpr::Expr(e)) => lower_expr(e),
            ast::FunctionArg::Unnamed(ast::FunctionArgExpr::Wildcard) => Ok(Expr::Wildcard),
            other => Err(LoweringError::unsupported(format!("function argument {}", other))),
        })
        .collect::<LoweringResult<Vec<_>>>()?;
    Ok(Expr::Function {
        name,
        args,
        distinct: function.distinct,
    })
}

/// `col`, `tbl.col` or `db.tbl.col`
pub(crate) fn lower_column(idents: &[ast::Ident]) -> LoweringResult<ColumnRef> {
    match idents {
        [column] => Ok(ColumnRef::new(column.value.clone())),
        [table, column] => Ok(ColumnRef::new(column.value.clone()).with_table(table.value.clone())),
        [schema, table, column] => Ok(ColumnRef::new(column.value.clone())
            .with_table(table.value.clone())
            .with_schema(schema.value.clone())),
        _ => Err(LoweringError::unsupported(format!(
            "column reference {}",
            ast::ObjectName(idents.to_vec())
        ))),
    }
}

/// `name` or `schema.name`
pub(crate) fn lower_object_name(name: &ast::ObjectName) -> LoweringResult<ObjectName> {
    match name.0.as_slice() {
        [table] => Ok(ObjectName::new(table.value.clone())),
        [schema, table] => Ok(ObjectName::new(table.value.clone()).with_schema(schema.value.clone())),
        _ => Err(LoweringError::unsupported(format!("object name {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::MySqlParser;

    fn expr(sql: &str) -> Expr {
        let mut p = MySqlParser::new(sql).unwrap();
        let e = lower_expr(&p.parser.parse_expr().unwrap()).unwrap();
        assert!(p.is_eof(), "trailing tokens in {}", sql);
        e
    }

    #[test]
    fn test_precedence_and_binds_tighter_than_or() {
        let e = expr("a = 1 OR b = 2 AND c = 3");
        assert!(matches!(e, Expr::BinaryOp { op: BinaryOp::Or, .. }));
        assert_eq!(e.to_string(), "a = 1 OR b = 2 AND c = 3");
    }

    #[test]
    fn test_predicates() {
        assert_eq!(expr("v1 is not null").to_string(), "v1 IS NOT NULL");
        assert_eq!(expr("v1 not in (1,2)").to_string(), "v1 NOT IN (1, 2)");
        assert_eq!(
            expr("id between 1 and 10").to_string(),
            "id BETWEEN 1 AND 10"
        );
        assert_eq!(expr("v2 like 'a%'").to_string(), "v2 LIKE 'a%'");
        assert_eq!(expr("id <> 3").to_string(), "id <> 3");
        assert_eq!(expr("id div 2 <=> 1").to_string(), "id / 2 <=> 1");
    }

    #[test]
    fn test_functions_and_subqueries() {
        assert_eq!(
            expr("count(distinct v1)").to_string(),
            "count(DISTINCT v1)"
        );
        assert_eq!(expr("COUNT(*)").to_string(), "COUNT(*)");
        let e = expr("id in (select id from t1)");
        assert_eq!(e.subqueries().len(), 1);
        let e = expr("not exists (select 1 from t1)");
        assert_eq!(e.subqueries().len(), 1);
    }

    #[test]
    fn test_qualified_columns_and_negative_numbers() {
        let e = expr("exist_db.t1.id = -1");
        match e {
            Expr::BinaryOp { left, right, .. } => {
                match *left {
                    Expr::Column(c) => {
                        assert_eq!(c.schema.as_deref(), Some("exist_db"));
                        assert_eq!(c.table.as_deref(), Some("t1"));
                    }
                    other => panic!("unexpected {:?}", other),
                }
                assert_eq!(*right, Expr::number("-1"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_case_expression() {
        assert_eq!(
            expr("case when a > 1 then 'x' else 'y' end").to_string(),
            "CASE WHEN a > 1 THEN 'x' ELSE 'y' END"
        );
    }

    #[test]
    fn test_unsupported_expressions() {
        let mut p = MySqlParser::new("now() - interval 1 day").unwrap();
        let err = lower_expr(&p.parser.parse_expr().unwrap()).unwrap_err();
        assert!(err.to_string().contains("INTERVAL"));
    }
}

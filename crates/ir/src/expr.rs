// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expressions
//!
//! This module represents SQL expressions in the IR.
//!
//! ## Design
//!
//! Expressions appear in WHERE/HAVING/ON predicates, SET assignments,
//! VALUES rows and column defaults. They can represent:
//!
//! - **Column references**: `table.column` or unqualified `column`
//! - **Literal values**: Numbers, strings, booleans, NULL
//! - **Binary operations**: Arithmetic, comparison, logical, pattern matching
//! - **Unary operations**: Negation, NOT, EXISTS
//! - **Function calls**: `COUNT(*)`, `NOW()`, `COUNT(DISTINCT col)`
//! - **Subqueries**: `(SELECT ...)` inside predicates
//!
//! Parentheses written in the source are preserved as [`Expr::Paren`], so
//! rendering an expression through `Display` reproduces the original
//! grouping without re-deriving operator precedence.
//!
//! ## Example
//!
//! ```text
//! BinaryOp {
//!   left: Column(id),
//!   op: Eq,
//!   right: Literal(Number("1")),
//! }
//! ```
//!
//! Renders as: `id = 1`

use crate::name::display_ident;
use crate::query::SelectStatement;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A SQL expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Expr {
    /// Column reference (e.g., `table.column` or just `column`)
    Column(ColumnRef),

    /// Literal value
    Literal(Literal),

    /// Binary operation (e.g., `a + b`, `x = 5`)
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// Unary operation (e.g., `-x`, `NOT a`)
    UnaryOp { op: UnaryOp, expr: Box<Expr> },

    /// Function call (e.g., `COUNT(*)`, `MAX(column)`)
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },

    /// `expr [NOT] BETWEEN low AND high`
    Between {
        expr: Box<Expr>,
        negated: bool,
        low: Box<Expr>,
        high: Box<Expr>,
    },

    /// CASE expression
    Case {
        operand: Option<Box<Expr>>,
        conditions: Vec<Expr>,
        results: Vec<Expr>,
        else_result: Option<Box<Expr>>,
    },

    /// Parenthesized expression
    Paren(Box<Expr>),

    /// List of expressions (e.g., for IN clause)
    List(Vec<Expr>),

    /// Scalar or IN subquery
    Subquery(Box<SelectStatement>),

    /// `*` inside a function call such as `COUNT(*)`
    Wildcard,

    /// The `DEFAULT` keyword in a VALUES row or SET assignment
    Default,
}

/// Column reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Optional schema qualifier (`db.tbl.col`)
    pub schema: Option<String>,
    /// Optional table/alias name
    pub table: Option<String>,
    /// Column name
    pub column: String,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: None,
            column: column.into(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn qualified(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.column),
            None => self.column.clone(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.", display_ident(schema))?;
        }
        if let Some(table) = &self.table {
            write!(f, "{}.", display_ident(table))?;
        }
        write!(f, "{}", display_ident(&self.column))
    }
}

/// Literal value
///
/// Numbers keep their source text so that rendering is lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    Number(String),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Boolean(true) => write!(f, "TRUE"),
            Literal::Boolean(false) => write!(f, "FALSE"),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "'{}'", escape_string(s)),
        }
    }
}

/// Escape a string value for inclusion in single quotes
pub fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NullSafeEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,
    Xor,

    // String
    Like,
    NotLike,

    // Other
    In,
    NotIn,
    Is,
    IsNot,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "=",
            BinaryOp::NullSafeEq => "<=>",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Xor => "XOR",
            BinaryOp::Like => "LIKE",
            BinaryOp::NotLike => "NOT LIKE",
            BinaryOp::In => "IN",
            BinaryOp::NotIn => "NOT IN",
            BinaryOp::Is => "IS",
            BinaryOp::IsNot => "IS NOT",
        }
    }

    /// Range comparisons, which end the usable prefix of a composite index
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::NotEq
                | BinaryOp::Like
                | BinaryOp::NotLike
        )
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum UnaryOp {
    Neg,
    Not,
    Exists,
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(ColumnRef::new(name))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn number(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::Number(value.into()))
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Strip any number of enclosing parentheses
    pub fn unparen(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren(inner) = expr {
            expr = inner;
        }
        expr
    }

    /// Flatten a conjunction into its AND-ed terms
    pub fn conjuncts(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        collect_conjuncts(self, &mut out);
        out
    }

    /// Column references in this expression, not descending into subqueries
    pub fn columns(&self) -> Vec<&ColumnRef> {
        let mut out = Vec::new();
        self.walk(&mut |e| {
            if let Expr::Column(c) = e {
                out.push(c);
            }
        });
        out
    }

    /// Subqueries directly nested in this expression
    pub fn subqueries(&self) -> Vec<&SelectStatement> {
        let mut out = Vec::new();
        self.walk(&mut |e| {
            if let Expr::Subquery(q) = e {
                out.push(q.as_ref());
            }
        });
        out
    }

    /// Text of a literal value without quoting, or the rendered expression
    /// for anything else
    pub fn value_text(&self) -> String {
        match self.unparen() {
            Expr::Literal(Literal::String(s)) => s.clone(),
            Expr::Literal(Literal::Number(n)) => n.clone(),
            other => other.to_string(),
        }
    }

    fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Expr)) {
        f(self);
        match self {
            Expr::BinaryOp { left, right, .. } => {
                left.walk(f);
                right.walk(f);
            }
            Expr::UnaryOp { expr, .. } | Expr::Paren(expr) => expr.walk(f),
            Expr::Function { args, .. } | Expr::List(args) => {
                for arg in args {
                    arg.walk(f);
                }
            }
            Expr::Between {
                expr, low, high, ..
            } => {
                expr.walk(f);
                low.walk(f);
                high.walk(f);
            }
            Expr::Case {
                operand,
                conditions,
                results,
                else_result,
            } => {
                if let Some(operand) = operand {
                    operand.walk(f);
                }
                for e in conditions.iter().chain(results.iter()) {
                    e.walk(f);
                }
                if let Some(e) = else_result {
                    e.walk(f);
                }
            }
            Expr::Column(_)
            | Expr::Literal(_)
            | Expr::Subquery(_)
            | Expr::Wildcard
            | Expr::Default => {}
        }
    }
}

fn collect_conjuncts<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match expr.unparen() {
        Expr::BinaryOp {
            left,
            op: BinaryOp::And,
            right,
        } => {
            collect_conjuncts(left, out);
            collect_conjuncts(right, out);
        }
        other => out.push(other),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(c) => write!(f, "{}", c),
            Expr::Literal(l) => write!(f, "{}", l),
            Expr::BinaryOp { left, op, right } => {
                write!(f, "{} {} {}", left, op.as_str(), right)
            }
            Expr::UnaryOp { op, expr } => match op {
                UnaryOp::Neg => write!(f, "-{}", expr),
                UnaryOp::Not => write!(f, "NOT {}", expr),
                UnaryOp::Exists => write!(f, "EXISTS {}", expr),
            },
            Expr::Function {
                name,
                args,
                distinct,
            } => {
                write!(f, "{}(", name)?;
                if *distinct {
                    write!(f, "DISTINCT ")?;
                }
                write_list(f, args, ", ")?;
                write!(f, ")")
            }
            Expr::Between {
                expr,
                negated,
                low,
                high,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{} {}BETWEEN {} AND {}", expr, not, low, high)
            }
            Expr::Case {
                operand,
                conditions,
                results,
                else_result,
            } => {
                write!(f, "CASE")?;
                if let Some(operand) = operand {
                    write!(f, " {}", operand)?;
                }
                for (cond, result) in conditions.iter().zip(results.iter()) {
                    write!(f, " WHEN {} THEN {}", cond, result)?;
                }
                if let Some(e) = else_result {
                    write!(f, " ELSE {}", e)?;
                }
                write!(f, " END")
            }
            Expr::Paren(inner) => write!(f, "({})", inner),
            Expr::List(items) => {
                write!(f, "(")?;
                write_list(f, items, ", ")?;
                write!(f, ")")
            }
            Expr::Subquery(q) => write!(f, "({})", q),
            Expr::Wildcard => write!(f, "*"),
            Expr::Default => write!(f, "DEFAULT"),
        }
    }
}

pub(crate) fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    sep: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

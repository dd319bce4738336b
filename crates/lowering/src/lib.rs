// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Review - Lowering Layer
//!
//! This crate turns MySQL statement text into the typed IR of
//! `sqlreview-ir`.
//!
//! ## Overview
//!
//! The lowering layer is responsible for:
//! - Splitting a batch into statement texts on `sqlparser` tokens
//! - Parsing each statement with the `sqlparser` MySQL dialect
//! - Lowering the parsed statement into the IR
//! - Precise errors for syntax outside the supported subset
//!
//! ## Lowering Process
//!
//! ```text
//! batch text → split_statements → MySqlParser → sqlparser AST → Statement
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqlreview_lowering::{parse_one, split_statements};
//!
//! for text in split_statements("use exist_db; alter table t1 add column v3 int;") {
//!     match parse_one(&text) {
//!         Ok(stmt) => println!("{}: {}", stmt.tag(), stmt),
//!         Err(e) => eprintln!("syntax error: {}", e),
//!     }
//! }
//! ```

mod ddl;
mod dml;
pub mod error;
mod expr;
mod query;
mod statement;

pub use error::{LoweringError, LoweringResult};
pub use statement::{MySqlParser, RECURSION_LIMIT};

use sqlparser::tokenizer::{Location, Token, Tokenizer};
use sqlreview_ir::Statement;

/// Lower a single statement
pub fn parse_one(sql: &str) -> LoweringResult<Statement> {
    MySqlParser::new(sql)?.parse_single()
}

/// Lower every statement of a batch, failing on the first error
pub fn parse_sql(sql: &str) -> LoweringResult<Vec<Statement>> {
    MySqlParser::new(sql)?.parse_statements()
}

/// Split a batch into trimmed statement texts at top-level `;`
///
/// Semicolons inside quotes and comments do not split. Pieces holding only
/// whitespace or comments are dropped. Text the tokenizer rejects is returned
/// whole so that parsing it reports the error.
pub fn split_statements(sql: &str) -> Vec<String> {
    let tokens = match Tokenizer::new(&statement::DIALECT, sql).tokenize_with_location() {
        Ok(tokens) => tokens,
        Err(_) => {
            let whole = sql.trim();
            return if whole.is_empty() {
                Vec::new()
            } else {
                vec![whole.to_string()]
            };
        }
    };

    let offsets = LineOffsets::new(sql);
    let mut parts = Vec::new();
    let mut start = 0;
    let mut has_content = false;
    for token in &tokens {
        match &token.token {
            Token::SemiColon => {
                let end = offsets.byte_offset(token.location);
                if has_content {
                    parts.push(sql[start..end].trim().to_string());
                }
                start = end + 1;
                has_content = false;
            }
            Token::Whitespace(_) | Token::EOF => {}
            _ => has_content = true,
        }
    }
    if has_content {
        parts.push(sql[start..].trim().to_string());
    }
    parts
}

/// Maps 1-based line/column token locations back to byte offsets
struct LineOffsets<'a> {
    sql: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineOffsets<'a> {
    fn new(sql: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(sql.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { sql, starts }
    }

    fn byte_offset(&self, location: Location) -> usize {
        let line_start = self
            .starts
            .get(location.line.saturating_sub(1) as usize)
            .copied()
            .unwrap_or(self.sql.len());
        self.sql[line_start..]
            .char_indices()
            .nth(location.column.saturating_sub(1) as usize)
            .map(|(i, _)| line_start + i)
            .unwrap_or(self.sql.len())
    }
}
